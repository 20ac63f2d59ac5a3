//! Bootstrap binary: initializes logging, loads configuration, and prepares
//! the database schema the engine runs against.

use lessonledger::{config, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal: env vars can be set externally.
    dotenvy::dotenv().ok();

    let app_config = config::settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!(database_url = %app_config.database_url, "configuration loaded");

    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create schema: {e}"))?;
    info!("scheduling and ledger database ready");

    Ok(())
}
