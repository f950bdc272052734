//! Password hashing and session plumbing for the authentication gate.
//!
//! Passwords are stored as `pbkdf2-sha256$<iterations>$<salt b64>$<key b64>`;
//! the raw password never reaches the database. Sessions are opaque bearer
//! tokens held in the in-process cache on `AppState`.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::warn;
use uuid::Uuid;

use crate::schemas::{AppState, ErrorResponse, SessionUser};

const PBKDF2_ITERATIONS: u32 = 200_000;
const SCHEME: &str = "pbkdf2-sha256";

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{}${}${}${}",
        SCHEME,
        PBKDF2_ITERATIONS,
        B64.encode(salt),
        B64.encode(key)
    )
}

/// Checks a password against a stored hash string. Malformed stored values
/// verify as false rather than erroring, keeping login failures generic.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(key)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME || parts.next().is_some() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = B64.decode(salt) else {
        return false;
    };
    let derived = derive_key(password, &salt, iterations.max(1));
    B64.encode(derived) == key
}

/// Issues an opaque bearer token for a new session.
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extracts the bearer token from the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Resolves the bearer token on a request to the logged-in user.
///
/// Every handler past the authentication gate calls this first; the returned
/// `SessionUser` is the owner all of its queries are scoped to.
pub async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionUser, (StatusCode, Json<ErrorResponse>)> {
    let Some(token) = bearer_token(headers) else {
        warn!("Request without bearer token");
        return Err(unauthorized());
    };

    match state.sessions.get(token).await {
        Some(user) => Ok(user),
        None => {
            warn!("Unknown or expired session token");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Not logged in".to_string(),
            code: "NOT_LOGGED_IN".to_string(),
            success: false,
        }),
    )
}
