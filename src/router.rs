use crate::handlers::{
    auth::{login, logout, register},
    dashboard::{get_balance_by_school, get_balance_summary, get_deliveries_by_good},
    deliveries::{create_delivery, get_deliveries},
    descriptions::{create_description, delete_description, get_descriptions},
    export::export_workbook,
    goods::{create_good, delete_good, get_goods},
    health::health_check,
    ledger::{create_ledger_entry, get_school_balance, get_school_ledger},
    schools::{create_school, delete_school, get_schools},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication gate
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        // School catalog
        .route("/api/v1/schools", get(get_schools))
        .route("/api/v1/schools", post(create_school))
        .route("/api/v1/schools/:school_id", delete(delete_school))
        // Goods catalog
        .route("/api/v1/goods", get(get_goods))
        .route("/api/v1/goods", post(create_good))
        .route("/api/v1/goods/:good_id", delete(delete_good))
        // Description catalog
        .route("/api/v1/descriptions", get(get_descriptions))
        .route("/api/v1/descriptions", post(create_description))
        .route(
            "/api/v1/descriptions/:description_id",
            delete(delete_description),
        )
        // Deliveries
        .route("/api/v1/deliveries", post(create_delivery))
        .route("/api/v1/deliveries", get(get_deliveries))
        // Ledger
        .route("/api/v1/ledger", post(create_ledger_entry))
        .route("/api/v1/schools/:school_id/ledger", get(get_school_ledger))
        .route(
            "/api/v1/schools/:school_id/balance",
            get(get_school_balance),
        )
        // Dashboard aggregates
        .route(
            "/api/v1/dashboard/deliveries-by-good",
            get(get_deliveries_by_good),
        )
        .route(
            "/api/v1/dashboard/balance-by-school",
            get(get_balance_by_school),
        )
        .route(
            "/api/v1/dashboard/balance-summary",
            get(get_balance_summary),
        )
        // Export
        .route("/api/v1/export", get(export_workbook))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
