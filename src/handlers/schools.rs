use crate::auth::require_session;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use model::entities::school;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for adding a school
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSchoolRequest {
    /// School name (must be unique within the logged-in user's scope)
    pub name: String,
}

/// School response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolResponse {
    pub id: i32,
    pub name: String,
}

impl From<school::Model> for SchoolResponse {
    fn from(model: school::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the user's schools
#[utoipa::path(
    get,
    path = "/api/v1/schools",
    tag = "schools",
    responses(
        (status = 200, description = "Schools retrieved successfully", body = ApiResponse<Vec<SchoolResponse>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_schools(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<SchoolResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Fetching schools for user {}", session.id);

    match school::Entity::find()
        .filter(school::Column::OwnerId.eq(session.id))
        .order_by_asc(school::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(schools) => {
            info!("Retrieved {} schools for user {}", schools.len(), session.id);
            let response = ApiResponse {
                data: schools.into_iter().map(SchoolResponse::from).collect(),
                message: "Schools retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve schools for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// Add a school
#[utoipa::path(
    post,
    path = "/api/v1/schools",
    tag = "schools",
    request_body = CreateSchoolRequest,
    responses(
        (status = 201, description = "School created successfully", body = ApiResponse<SchoolResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "School already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_school(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSchoolRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SchoolResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Creating school '{}' for user {}", request.name, session.id);

    let new_school = school::ActiveModel {
        name: Set(request.name.clone()),
        owner_id: Set(session.id),
        ..Default::default()
    };

    match new_school.insert(&state.db).await {
        Ok(school_model) => {
            info!(
                "School created successfully with ID: {}, name: {}",
                school_model.id, school_model.name
            );
            let response = ApiResponse {
                data: SchoolResponse::from(school_model),
                message: "School created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create school '{}' for user {}: {}",
                request.name, session.id, db_error
            );
            Err(map_insert_error("School", &request.name, &db_error))
        }
    }
}

/// Remove a school by id
#[utoipa::path(
    delete,
    path = "/api/v1/schools/{school_id}",
    tag = "schools",
    params(
        ("school_id" = i32, Path, description = "School ID"),
    ),
    responses(
        (status = 200, description = "School deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_school(
    Path(school_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Deleting school {} for user {}", school_id, session.id);

    // Deliveries and ledger entries referencing this school are left in
    // place; their school id dangles from here on.
    match school::Entity::delete_many()
        .filter(school::Column::Id.eq(school_id))
        .filter(school::Column::OwnerId.eq(session.id))
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("School {} deleted for user {}", school_id, session.id);
                let response = ApiResponse {
                    data: format!("School {} deleted", school_id),
                    message: "School deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("School {} not found for user {}", school_id, session.id);
                Err(not_found())
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete school {} for user {}: {}",
                school_id, session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// Unique index violations surface as a user-visible "already exists".
pub(crate) fn map_insert_error(
    kind: &str,
    name: &str,
    db_error: &DbErr,
) -> (StatusCode, Json<ErrorResponse>) {
    let message = db_error.to_string().to_lowercase();
    if message.contains("unique") || message.contains("constraint") {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("{} '{}' already exists", kind, name),
                code: "ALREADY_EXISTS".to_string(),
                success: false,
            }),
        )
    } else {
        internal_error()
    }
}

pub(crate) fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "School not found".to_string(),
            code: "SCHOOL_NOT_FOUND".to_string(),
            success: false,
        }),
    )
}
