use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::time::Duration;
use tracing::info;

use crate::schemas::AppState;

/// Sessions expire after eight hours without activity.
const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Initialize application state from an explicit database URL.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Logged-in sessions live here; losing the process logs everyone out,
    // exactly like the interactive sessions this replaces.
    let sessions = Cache::builder()
        .max_capacity(10_000)
        .time_to_idle(SESSION_TTL)
        .build();

    Ok(AppState { db, sessions })
}
