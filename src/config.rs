use crate::schemas::AppState;
use anyhow::Result;
use sea_orm::Database;

/// Initialize application configuration and state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    // Load environment overrides from .env if present
    dotenvy::dotenv().ok();

    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState { db })
}
