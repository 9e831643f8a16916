//! PostgreSQL persistence for owners, properties, images, and price traces.
//!
//! Table-level repositories live in [`repositories`]; the
//! [`PropertyRepository`] facade composes them into the service operations
//! and converts storage failures into [`estate_core::error::CoreError`].

use estate_core::config::DbConfig;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod property_repository;
pub mod repositories;

pub use property_repository::PropertyRepository;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
