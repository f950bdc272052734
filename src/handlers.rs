pub mod auth;
pub mod dashboard;
pub mod deliveries;
pub mod descriptions;
pub mod export;
pub mod goods;
pub mod health;
pub mod ledger;
pub mod schools;
