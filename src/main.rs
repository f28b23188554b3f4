use std::sync::Arc;

use lockbox::{
    api::{start_api_server, ApiState},
    config::{AppConfig, SecurityConfig},
    observability::{init_observability, log_config_info},
    services::{CryptoEngine, SecretService},
    storage::{create_pool, get_migration_version, SqlxSecretRepository},
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if the error is NOT "file not found"
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env();
    let _log_guard = init_observability(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Lockbox secret store");

    config.validate()?;
    log_config_info(&config);

    // The master key stays out of AppConfig; it is loaded separately and
    // handed straight to the API state.
    let security = SecurityConfig::from_env()?;

    let pool = create_pool(&config.database).await?;
    let schema_version = get_migration_version(&pool).await?;
    info!(schema_version, "Database ready");

    let repository = Arc::new(SqlxSecretRepository::new(pool.clone()));
    let service = Arc::new(SecretService::new(repository, CryptoEngine::new()));

    let state = ApiState { service, master_key: security.master_key, pool };

    start_api_server(&config.server, state).await?;

    info!("Lockbox shutdown completed");
    Ok(())
}
