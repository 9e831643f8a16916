//! Connects to the configured database, checks it, applies migrations, and
//! prepares the upload directory.

use std::process::ExitCode;

use estate_core::config::{DbConfig, StorageConfig};
use estate_core::storage::LocalFileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_db=debug,estate_migrate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DbConfig::from_env()?;

    let pool = estate_db::create_pool(&config).await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    estate_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    estate_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    pool.close().await;

    let files = LocalFileStore::from_config(&StorageConfig::from_env());
    let upload_dir = files.ensure_root().await?;
    tracing::info!(upload_dir = %upload_dir.display(), "Upload directory ready");

    Ok(())
}
