use crate::auth::require_session;
use crate::handlers::schools::internal_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SessionUser};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use model::entities::{delivery, good, school};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recording a delivery
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateDeliveryRequest {
    /// School receiving the delivery
    pub school_id: i32,
    /// Good being delivered
    pub good_id: i32,
    /// Delivery date
    pub date: NaiveDate,
    /// Quantity delivered; the entry form clamps to this range
    #[validate(range(min = 0, max = 10000))]
    pub quantity: i32,
}

/// Delivery response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResponse {
    pub id: i32,
    pub school_id: i32,
    pub good_id: i32,
    pub date: NaiveDate,
    pub quantity: i32,
}

impl From<delivery::Model> for DeliveryResponse {
    fn from(model: delivery::Model) -> Self {
        Self {
            id: model.id,
            school_id: model.school_id,
            good_id: model.good_id,
            date: model.date,
            quantity: model.quantity,
        }
    }
}

/// Record a delivery
#[utoipa::path(
    post,
    path = "/api/v1/deliveries",
    tag = "deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 201, description = "Delivery recorded successfully", body = ApiResponse<DeliveryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "School or good not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Valid(Json(request)): Valid<Json<CreateDeliveryRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<DeliveryResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!(
        "Recording delivery of good {} to school {} for user {}",
        request.good_id, request.school_id, session.id
    );

    // Both catalog entries must exist in the caller's scope before the form
    // is usable; deliveries are append-only after that, with no duplicate
    // detection.
    require_school(&state, &session, request.school_id).await?;
    require_good(&state, &session, request.good_id).await?;

    let new_delivery = delivery::ActiveModel {
        school_id: Set(request.school_id),
        good_id: Set(request.good_id),
        date: Set(request.date),
        quantity: Set(request.quantity),
        owner_id: Set(session.id),
        ..Default::default()
    };

    match new_delivery.insert(&state.db).await {
        Ok(delivery_model) => {
            info!(
                "Delivery recorded with ID: {} for user {}",
                delivery_model.id, session.id
            );
            let response = ApiResponse {
                data: DeliveryResponse::from(delivery_model),
                message: "Delivery recorded successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to record delivery for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

/// List the user's deliveries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/deliveries",
    tag = "deliveries",
    responses(
        (status = 200, description = "Deliveries retrieved successfully", body = ApiResponse<Vec<DeliveryResponse>>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_deliveries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<DeliveryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;
    debug!("Fetching deliveries for user {}", session.id);

    match delivery::Entity::find()
        .filter(delivery::Column::OwnerId.eq(session.id))
        .order_by_desc(delivery::Column::Date)
        .order_by_desc(delivery::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(deliveries) => {
            info!(
                "Retrieved {} deliveries for user {}",
                deliveries.len(),
                session.id
            );
            let response = ApiResponse {
                data: deliveries.into_iter().map(DeliveryResponse::from).collect(),
                message: "Deliveries retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve deliveries for user {}: {}",
                session.id, db_error
            );
            Err(internal_error())
        }
    }
}

async fn require_school(
    state: &AppState,
    session: &SessionUser,
    school_id: i32,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    match school::Entity::find()
        .filter(school::Column::Id.eq(school_id))
        .filter(school::Column::OwnerId.eq(session.id))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => Ok(()),
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

async fn require_good(
    state: &AppState,
    session: &SessionUser,
    good_id: i32,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    match good::Entity::find()
        .filter(good::Column::Id.eq(good_id))
        .filter(good::Column::OwnerId.eq(session.id))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
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
        Err(db_error) => {
            error!("Failed to look up good {}: {}", good_id, db_error);
            Err(internal_error())
        }
    }
}
