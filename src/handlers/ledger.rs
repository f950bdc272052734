use crate::auth::require_session;
use crate::handlers::schools::internal_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SessionUser};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::NaiveDate;
use common::{LedgerLine, SchoolBalance};
use model::entities::{ledger_entry, school};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for recording a ledger entry
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLedgerEntryRequest {
    /// School the entry is attributed to
    pub school_id: i32,
    /// Entry date
    pub date: NaiveDate,
    /// Good label, copied into the entry as written
    pub good: String,
    /// Description label, copied into the entry as written
    pub description: String,
    /// Amount debited; missing counts as zero
    pub debit: Option<Decimal>,
    /// Amount credited; missing counts as zero
    pub credit: Option<Decimal>,
}

/// Ledger entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i32,
    pub school_id: i32,
    pub date: NaiveDate,
    pub good: String,
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(model: ledger_entry::Model) -> Self {
        Self {
            id: model.id,
            school_id: model.school_id,
            date: model.date,
            good: model.good,
            description: model.description,
            debit: model.debit,
            credit: model.credit,
        }
    }
}

/// Record a ledger entry
#[utoipa::path(
    post,
    path = "/api/v1/ledger",
    tag = "ledger",
    request_body = CreateLedgerEntryRequest,
    responses(
        (status = 201, description = "Ledger entry recorded successfully", body = ApiResponse<LedgerEntryResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_ledger_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateLedgerEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LedgerEntryResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    let session = require_session(&state, &headers).await?;
    debug!(
        "Recording ledger entry for school {} user {}",
        request.school_id, session.id
    );

    find_owned_school(&state, &session, request.school_id).await?;

    // The labels are stored as literal text on purpose: renaming or removing
    // a catalog entry later must not rewrite this row.
    let new_entry = ledger_entry::ActiveModel {
        school_id: Set(request.school_id),
        date: Set(request.date),
        good: Set(request.good.clone()),
        description: Set(request.description.clone()),
        debit: Set(request.debit),
        credit: Set(request.credit),
        owner_id: Set(session.id),
        ..Default::default()
    };

    match new_entry.insert(&state.db).await {
        Ok(entry_model) => {
            info!(
                "Ledger entry recorded with ID: {} for user {}",
                entry_model.id, session.id
            );
            let response = ApiResponse {
                data: LedgerEntryResponse::from(entry_model),
                message: "Ledger entry recorded successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to record ledger entry for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// Get a school's ledger, newest first, with running balances
#[utoipa::path(
    get,
    path = "/api/v1/schools/{school_id}/ledger",
    tag = "ledger",
    params(
        ("school_id" = i32, Path, description = "School ID"),
    ),
    responses(
        (status = 200, description = "Ledger retrieved successfully", body = ApiResponse<Vec<LedgerLine>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_school_ledger(
    Path(school_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<LedgerLine>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!(
        "Fetching ledger for school {} user {}",
        school_id, session.id
    );

    find_owned_school(&state, &session, school_id).await?;

    let entries = match compute::ledger::entries_for_school(&state.db, session.id, school_id).await
    {
        Ok(entries) => entries,
        Err(compute_error) => {
            error!(
                "Failed to fetch ledger entries for school {}: {}",
                school_id, compute_error
            );
            return Err(internal_error());
        }
    };

    let lines = compute::ledger::running_balance_descending(entries);

    info!(
        "Retrieved {} ledger lines for school {} user {}",
        lines.len(),
        school_id,
        session.id
    );
    let response = ApiResponse {
        data: lines,
        message: "Ledger retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a school's final balance
#[utoipa::path(
    get,
    path = "/api/v1/schools/{school_id}/balance",
    tag = "ledger",
    params(
        ("school_id" = i32, Path, description = "School ID"),
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = ApiResponse<SchoolBalance>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_school_balance(
    Path(school_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SchoolBalance>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!(
        "Fetching balance for school {} user {}",
        school_id, session.id
    );

    let school_model = find_owned_school(&state, &session, school_id).await?;

    match compute::ledger::final_balance(&state.db, session.id, school_id).await {
        Ok(balance) => {
            let response = ApiResponse {
                data: SchoolBalance {
                    school_id,
                    school: school_model.name,
                    balance,
                },
                message: "Balance retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(compute_error) => {
            error!(
                "Failed to compute balance for school {}: {}",
                school_id, compute_error
            );
            Err(internal_error())
        }
    }
}

async fn find_owned_school(
    state: &AppState,
    session: &SessionUser,
    school_id: i32,
) -> Result<school::Model, (StatusCode, Json<ErrorResponse>)> {
    match school::Entity::find()
        .filter(school::Column::Id.eq(school_id))
        .filter(school::Column::OwnerId.eq(session.id))
        .one(&state.db)
        .await
    {
        Ok(Some(school_model)) => Ok(school_model),
        Ok(None) => {
            warn!("School {} not found for user {}", school_id, session.id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "School not found".to_string(),
                    code: "SCHOOL_NOT_FOUND".to_string(),
                    success: false,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to look up school {}: {}", school_id, db_error);
            Err(internal_error())
        }
    }
}
