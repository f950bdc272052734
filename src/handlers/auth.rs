use crate::auth::{bearer_token, hash_password, new_session_token, require_session, verify_password};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SessionUser};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use model::entities::user;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for creating a new account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Email address (unique, compared case-insensitively)
    pub email: String,
    /// Password, stored as a salted hash
    pub password: String,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Email address (compared case-insensitively)
    pub email: String,
    /// Password
    pub password: String,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Response body for a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token identifying the session
    pub token: String,
    pub user: UserResponse,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Looks a user up by email, ignoring case. Returns the first match.
async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.to_lowercase()))
        .one(db)
        .await
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<UserResponse>),
        (status = 409, description = "Email already used", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Registering account for email: {}", request.email);

    // The unique index on email is case-sensitive while the login lookup is
    // not, so check the lowered form up front: "A@x.com" and "a@x.com" must
    // not coexist.
    match find_by_email(&state.db, &request.email).await {
        Ok(Some(_)) => {
            warn!("Registration rejected, email already used: {}", request.email);
            return Err(email_conflict());
        }
        Ok(None) => {}
        Err(db_error) => {
            error!(
                "Failed to check existing email '{}': {}",
                request.email, db_error
            );
            return Err(email_conflict());
        }
    }

    let new_user = user::ActiveModel {
        name: Set(request.name.clone()),
        email: Set(request.email.clone()),
        password_hash: Set(hash_password(&request.password)),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(
                "User created successfully with ID: {}, email: {}",
                user_model.id, user_model.email
            );
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "Account created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            // Every insert failure folds into the same user-visible outcome.
            error!(
                "Failed to create account for '{}': {}",
                request.email, db_error
            );
            Err(email_conflict())
        }
    }
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in successfully", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Login attempt for email: {}", request.email);

    let user_model = match find_by_email(&state.db, &request.email).await {
        Ok(Some(user_model)) => user_model,
        Ok(None) => {
            warn!("Login attempt for unknown email: {}", request.email);
            return Err(invalid_credentials());
        }
        Err(db_error) => {
            error!("Failed to look up email '{}': {}", request.email, db_error);
            return Err(invalid_credentials());
        }
    };

    if !verify_password(&request.password, &user_model.password_hash) {
        warn!("Failed login attempt for email: {}", request.email);
        return Err(invalid_credentials());
    }

    let token = new_session_token();
    state
        .sessions
        .insert(
            token.clone(),
            SessionUser {
                id: user_model.id,
                name: user_model.name.clone(),
            },
        )
        .await;

    info!("User {} logged in", user_model.id);
    let response = ApiResponse {
        data: LoginResponse {
            token,
            user: UserResponse::from(user_model),
        },
        message: "Logged in successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session ended", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let session = require_session(&state, &headers).await?;

    if let Some(token) = bearer_token(&headers) {
        state.sessions.invalidate(token).await;
    }

    info!("User {} logged out", session.id);
    let response = ApiResponse {
        data: "Logged out".to_string(),
        message: "Session ended successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// One failure shape for both unknown email and wrong password, so responses
/// do not leak which emails are registered.
fn invalid_credentials() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Invalid email or password".to_string(),
            code: "INVALID_CREDENTIALS".to_string(),
            success: false,
        }),
    )
}

fn email_conflict() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: "Email already used".to_string(),
            code: "EMAIL_ALREADY_USED".to_string(),
            success: false,
        }),
    )
}
