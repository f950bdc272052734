use crate::auth::require_session;
use crate::handlers::schools::{internal_error, map_insert_error};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use model::entities::good;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for adding a good
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateGoodRequest {
    /// Good name (must be unique within the logged-in user's scope)
    pub name: String,
}

/// Good response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoodResponse {
    pub id: i32,
    pub name: String,
}

impl From<good::Model> for GoodResponse {
    fn from(model: good::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the user's goods
#[utoipa::path(
    get,
    path = "/api/v1/goods",
    tag = "goods",
    responses(
        (status = 200, description = "Goods retrieved successfully", body = ApiResponse<Vec<GoodResponse>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_goods(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<GoodResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Fetching goods for user {}", session.id);

    match good::Entity::find()
        .filter(good::Column::OwnerId.eq(session.id))
        .order_by_asc(good::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(goods) => {
            info!("Retrieved {} goods for user {}", goods.len(), session.id);
            let response = ApiResponse {
                data: goods.into_iter().map(GoodResponse::from).collect(),
                message: "Goods retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve goods for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// Add a good
#[utoipa::path(
    post,
    path = "/api/v1/goods",
    tag = "goods",
    request_body = CreateGoodRequest,
    responses(
        (status = 201, description = "Good created successfully", body = ApiResponse<GoodResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "Good already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_good(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateGoodRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GoodResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Creating good '{}' for user {}", request.name, session.id);

    let new_good = good::ActiveModel {
        name: Set(request.name.clone()),
        owner_id: Set(session.id),
        ..Default::default()
    };

    match new_good.insert(&state.db).await {
        Ok(good_model) => {
            info!(
                "Good created successfully with ID: {}, name: {}",
                good_model.id, good_model.name
            );
            let response = ApiResponse {
                data: GoodResponse::from(good_model),
                message: "Good created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create good '{}' for user {}: {}",
                request.name, session.id, db_error
            );
            Err(map_insert_error("Good", &request.name, &db_error))
        }
    }
}

/// Remove a good by id
#[utoipa::path(
    delete,
    path = "/api/v1/goods/{good_id}",
    tag = "goods",
    params(
        ("good_id" = i32, Path, description = "Good ID"),
    ),
    responses(
        (status = 200, description = "Good deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Good not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_good(
    Path(good_id): Path<i32>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Deleting good {} for user {}", good_id, session.id);

    // Existing deliveries keep their good id; ledger entries only ever held
    // the label text, so history is untouched either way.
    match good::Entity::delete_many()
        .filter(good::Column::Id.eq(good_id))
        .filter(good::Column::OwnerId.eq(session.id))
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Good {} deleted for user {}", good_id, session.id);
                let response = ApiResponse {
                    data: format!("Good {} deleted", good_id),
                    message: "Good deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Good {} not found for user {}", good_id, session.id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: "Good not found".to_string(),
                        code: "GOOD_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete good {} for user {}: {}",
                good_id, session.id, db_error
            );
            Err(internal_error())
        }
    }
}
