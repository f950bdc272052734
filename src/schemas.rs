use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::handlers;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Logged-in sessions, keyed by bearer token
    pub sessions: Cache<String, SessionUser>,
}

/// The identity established by a successful login. Handlers resolve it from
/// the session cache and scope every query to `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::schools::get_schools,
        handlers::schools::create_school,
        handlers::schools::delete_school,
        handlers::goods::get_goods,
        handlers::goods::create_good,
        handlers::goods::delete_good,
        handlers::descriptions::get_descriptions,
        handlers::descriptions::create_description,
        handlers::descriptions::delete_description,
        handlers::deliveries::create_delivery,
        handlers::deliveries::get_deliveries,
        handlers::ledger::create_ledger_entry,
        handlers::ledger::get_school_ledger,
        handlers::ledger::get_school_balance,
        handlers::dashboard::get_deliveries_by_good,
        handlers::dashboard::get_balance_by_school,
        handlers::dashboard::get_balance_summary,
        handlers::export::export_workbook,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            handlers::auth::RegisterRequest,
            handlers::auth::LoginRequest,
            handlers::auth::LoginResponse,
            handlers::auth::UserResponse,
            handlers::schools::CreateSchoolRequest,
            handlers::schools::SchoolResponse,
            handlers::goods::CreateGoodRequest,
            handlers::goods::GoodResponse,
            handlers::descriptions::CreateDescriptionRequest,
            handlers::descriptions::DescriptionResponse,
            handlers::deliveries::CreateDeliveryRequest,
            handlers::deliveries::DeliveryResponse,
            handlers::ledger::CreateLedgerEntryRequest,
            handlers::ledger::LedgerEntryResponse,
            common::LedgerLine,
            common::SchoolBalance,
            common::DeliveryTotal,
            ApiResponse<handlers::auth::UserResponse>,
            ApiResponse<handlers::auth::LoginResponse>,
            ApiResponse<Vec<handlers::schools::SchoolResponse>>,
            ApiResponse<Vec<common::LedgerLine>>,
            ApiResponse<Vec<common::SchoolBalance>>,
            ApiResponse<Vec<common::DeliveryTotal>>,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, registration and logout"),
        (name = "schools", description = "School catalog management"),
        (name = "goods", description = "Goods catalog management"),
        (name = "descriptions", description = "Description catalog management"),
        (name = "deliveries", description = "Delivery recording"),
        (name = "ledger", description = "Ledger entries and balances"),
        (name = "dashboard", description = "Aggregated views for the overview charts"),
        (name = "export", description = "Workbook export"),
    ),
    info(
        title = "Merenda API",
        description = "School delivery and financial ledger tracker",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
