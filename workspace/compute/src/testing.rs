//! Shared fixtures for the compute tests: an in-memory database plus small
//! row-insertion helpers.

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{delivery, good, ledger_entry, school, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn insert_user(db: &DatabaseConnection, email: &str) -> i32 {
    let model = user::ActiveModel {
        name: Set("Test User".to_string()),
        email: Set(email.to_string()),
        password_hash: Set("pbkdf2-sha256$1$c2FsdA==$aGFzaA==".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user");
    model.id
}

pub async fn insert_school(db: &DatabaseConnection, owner_id: i32, name: &str) -> i32 {
    let model = school::ActiveModel {
        name: Set(name.to_string()),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert school");
    model.id
}

pub async fn insert_good(db: &DatabaseConnection, owner_id: i32, name: &str) -> i32 {
    let model = good::ActiveModel {
        name: Set(name.to_string()),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert good");
    model.id
}

pub async fn insert_delivery(
    db: &DatabaseConnection,
    owner_id: i32,
    school_id: i32,
    good_id: i32,
    date: NaiveDate,
    quantity: i32,
) -> i32 {
    let model = delivery::ActiveModel {
        school_id: Set(school_id),
        good_id: Set(good_id),
        date: Set(date),
        quantity: Set(quantity),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert delivery");
    model.id
}

pub async fn insert_entry(
    db: &DatabaseConnection,
    owner_id: i32,
    school_id: i32,
    date: NaiveDate,
    debit: Option<i64>,
    credit: Option<i64>,
) -> i32 {
    let model = ledger_entry::ActiveModel {
        school_id: Set(school_id),
        date: Set(date),
        good: Set("Arroz".to_string()),
        description: Set("Compra".to_string()),
        debit: Set(debit.map(Decimal::from)),
        credit: Set(credit.map(Decimal::from)),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert ledger entry");
    model.id
}
