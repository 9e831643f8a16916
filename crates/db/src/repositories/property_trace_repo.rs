//! Repository for the `property_traces` table.
//!
//! Traces are an append-only audit log: there are no update or delete
//! methods.

use estate_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::property_trace::{CreatePropertyTrace, PropertyTrace};

const COLUMNS: &str = "id, property_id, date_sale, name, value, tax, created_at, updated_at";

/// Provides append and query operations for property traces.
pub struct PropertyTraceRepo;

impl PropertyTraceRepo {
    /// Append a trace. `name` defaults to `PRICE_CHANGE` and `tax` to 0.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreatePropertyTrace,
    ) -> Result<PropertyTrace, sqlx::Error> {
        let query = format!(
            "INSERT INTO property_traces (property_id, date_sale, name, value, tax)
             VALUES ($1, $2, COALESCE($3, 'PRICE_CHANGE'), $4, COALESCE($5, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PropertyTrace>(&query)
            .bind(input.property_id)
            .bind(input.date_sale)
            .bind(&input.name)
            .bind(input.value)
            .bind(input.tax)
            .fetch_one(executor)
            .await
    }

    /// All traces for a property in the order they were written.
    pub async fn list_for_property(
        executor: impl PgExecutor<'_>,
        property_id: DbId,
    ) -> Result<Vec<PropertyTrace>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM property_traces WHERE property_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, PropertyTrace>(&query)
            .bind(property_id)
            .fetch_all(executor)
            .await
    }

    /// Number of traces recorded for a property.
    pub async fn count_for_property(
        executor: impl PgExecutor<'_>,
        property_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM property_traces WHERE property_id = $1",
        )
        .bind(property_id)
        .fetch_one(executor)
        .await
    }

    /// Total number of traces across all properties.
    pub async fn count(executor: impl PgExecutor<'_>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM property_traces")
            .fetch_one(executor)
            .await
    }
}
