use crate::auth::require_session;
use crate::handlers::schools::internal_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use common::{DeliveryTotal, SchoolBalance};
use tracing::{debug, error, info, instrument};

/// Total quantity delivered per good, for the overview bar chart
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/deliveries-by-good",
    tag = "dashboard",
    responses(
        (status = 200, description = "Delivery totals retrieved successfully", body = ApiResponse<Vec<DeliveryTotal>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_deliveries_by_good(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<DeliveryTotal>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Aggregating deliveries by good for user {}", session.id);

    match compute::delivery::totals_by_good(&state.db, session.id).await {
        Ok(totals) => {
            info!(
                "Aggregated deliveries across {} goods for user {}",
                totals.len(),
                session.id
            );
            let response = ApiResponse {
                data: totals,
                message: "Delivery totals retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(compute_error) => {
            error!(
                "Failed to aggregate deliveries for user {}: {}",
                session.id, compute_error
            );
            Err(internal_error())
        }
    }
}

/// Net balance per school with ledger entries, for the overview bar chart
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/balance-by-school",
    tag = "dashboard",
    responses(
        (status = 200, description = "Balances retrieved successfully", body = ApiResponse<Vec<SchoolBalance>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_balance_by_school(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<SchoolBalance>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Aggregating balances by school for user {}", session.id);

    match compute::ledger::balance_by_school(&state.db, session.id).await {
        Ok(balances) => {
            info!(
                "Aggregated balances across {} schools for user {}",
                balances.len(),
                session.id
            );
            let response = ApiResponse {
                data: balances,
                message: "Balances retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(compute_error) => {
            error!(
                "Failed to aggregate balances for user {}: {}",
                session.id, compute_error
            );
            Err(internal_error())
        }
    }
}

/// Final balance for every school, zero when a school has no entries
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/balance-summary",
    tag = "dashboard",
    responses(
        (status = 200, description = "Balance summary retrieved successfully", body = ApiResponse<Vec<SchoolBalance>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_balance_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<SchoolBalance>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Building balance summary for user {}", session.id);

    match compute::ledger::balance_summary(&state.db, session.id).await {
        Ok(summary) => {
            info!(
                "Balance summary covers {} schools for user {}",
                summary.len(),
                session.id
            );
            let response = ApiResponse {
                data: summary,
                message: "Balance summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(compute_error) => {
            error!(
                "Failed to build balance summary for user {}: {}",
                session.id, compute_error
            );
            Err(internal_error())
        }
    }
}
