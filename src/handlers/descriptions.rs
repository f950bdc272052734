use crate::auth::require_session;
use crate::handlers::schools::{internal_error, map_insert_error};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use model::entities::description;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for adding a description
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateDescriptionRequest {
    /// Description text (must be unique within the logged-in user's scope)
    pub text: String,
}

/// Description response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DescriptionResponse {
    pub id: i32,
    pub text: String,
}

impl From<description::Model> for DescriptionResponse {
    fn from(model: description::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
        }
    }
}

/// List the user's descriptions
#[utoipa::path(
    get,
    path = "/api/v1/descriptions",
    tag = "descriptions",
    responses(
        (status = 200, description = "Descriptions retrieved successfully", body = ApiResponse<Vec<DescriptionResponse>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_descriptions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<DescriptionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Fetching descriptions for user {}", session.id);

    match description::Entity::find()
        .filter(description::Column::OwnerId.eq(session.id))
        .order_by_asc(description::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(descriptions) => {
            info!(
                "Retrieved {} descriptions for user {}",
                descriptions.len(),
                session.id
            );
            let response = ApiResponse {
                data: descriptions
                    .into_iter()
                    .map(DescriptionResponse::from)
                    .collect(),
                message: "Descriptions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve descriptions for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// Add a description
#[utoipa::path(
    post,
    path = "/api/v1/descriptions",
    tag = "descriptions",
    request_body = CreateDescriptionRequest,
    responses(
        (status = 201, description = "Description created successfully", body = ApiResponse<DescriptionResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "Description already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_description(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateDescriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DescriptionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    let session = require_session(&state, &headers).await?;
    debug!(
        "Creating description '{}' for user {}",
        request.text, session.id
    );

    let new_description = description::ActiveModel {
        text: Set(request.text.clone()),
        owner_id: Set(session.id),
        ..Default::default()
    };

    match new_description.insert(&state.db).await {
        Ok(description_model) => {
            info!(
                "Description created successfully with ID: {}",
                description_model.id
            );
            let response = ApiResponse {
                data: DescriptionResponse::from(description_model),
                message: "Description created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create description '{}' for user {}: {}",
                request.text, session.id, db_error
            );
            Err(map_insert_error("Description", &request.text, &db_error))
        }
    }
}

/// Remove a description by id
#[utoipa::path(
    delete,
    path = "/api/v1/descriptions/{description_id}",
    tag = "descriptions",
    params(
        ("description_id" = i32, Path, description = "Description ID"),
    ),
    responses(
        (status = 200, description = "Description deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Description not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_description(
    Path(description_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!(
        "Deleting description {} for user {}",
        description_id, session.id
    );

    // Ledger entries carry the label text itself, so existing entries keep
    // reading the same after the catalog row is gone.
    match description::Entity::delete_many()
        .filter(description::Column::Id.eq(description_id))
        .filter(description::Column::OwnerId.eq(session.id))
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!(
                    "Description {} deleted for user {}",
                    description_id, session.id
                );
                let response = ApiResponse {
                    data: format!("Description {} deleted", description_id),
                    message: "Description deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!(
                    "Description {} not found for user {}",
                    description_id, session.id
                );
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: "Description not found".to_string(),
                        code: "DESCRIPTION_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete description {} for user {}: {}",
                description_id, session.id, db_error
            );
            Err(internal_error())
        }
    }
}
