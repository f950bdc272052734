use crate::auth::require_session;
use crate::export::build_workbook;
use crate::handlers::schools::internal_error;
use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, error, info, instrument};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download the user's data as an xlsx workbook
#[utoipa::path(
    get,
    path = "/api/v1/export",
    tag = "export",
    responses(
        (status = 200, description = "Workbook with one sheet per school plus a summary sheet"),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn export_workbook(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Exporting workbook for user {}", session.id);

    let statements = match compute::ledger::school_statements(&state.db, session.id).await {
        Ok(statements) => statements,
        Err(compute_error) => {
            error!(
                "Failed to assemble statements for user {}: {}",
                session.id, compute_error
            );
            return Err(internal_error());
        }
    };

    let summary = match compute::ledger::balance_summary(&state.db, session.id).await {
        Ok(summary) => summary,
        Err(compute_error) => {
            error!(
                "Failed to build balance summary for user {}: {}",
                session.id, compute_error
            );
            return Err(internal_error());
        }
    };

    let bytes = match build_workbook(&statements, &summary) {
        Ok(bytes) => bytes,
        Err(xlsx_error) => {
            error!(
                "Failed to build workbook for user {}: {}",
                session.id, xlsx_error
            );
            return Err(internal_error());
        }
    };

    info!(
        "Exported workbook with {} school sheets for user {}",
        statements.len(),
        session.id
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"Controle_Escolas.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
