//! Repository for the `properties` table.

use estate_core::pagination::PageRequest;
use estate_core::sort::PropertySort;
use estate_core::types::{DbId, Money};
use sqlx::PgExecutor;

use crate::models::property::{CreateProperty, Property, PropertyListItem, ResolvedPropertyFields};
use crate::repositories::property_query::PropertyQuery;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, address, price, code_internal, year, owner_id, created_at, updated_at";

/// Provides insert, update, and listing operations for properties.
pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a new property, returning the created row.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateProperty,
    ) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (name, address, price, code_internal, year, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.price)
            .bind(&input.code_internal)
            .bind(input.year)
            .bind(input.owner_id)
            .fetch_one(executor)
            .await
    }

    /// Find a property by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a property by id and lock the row until the transaction ends.
    ///
    /// Must run inside a transaction; outside one the lock is released
    /// immediately.
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Count properties with exactly this internal code.
    pub async fn count_by_code(
        executor: impl PgExecutor<'_>,
        code_internal: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM properties WHERE code_internal = $1",
        )
        .bind(code_internal)
        .fetch_one(executor)
        .await
    }

    /// Set the price column. Returns `true` if a row was updated.
    pub async fn update_price(
        executor: impl PgExecutor<'_>,
        id: DbId,
        price: Money,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE properties SET price = $2 WHERE id = $1")
            .bind(id)
            .bind(price)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write all four updatable columns from already-resolved values.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_fields(
        executor: impl PgExecutor<'_>,
        id: DbId,
        fields: &ResolvedPropertyFields,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET
                name = $2,
                address = $3,
                year = $4,
                owner_id = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.address)
            .bind(fields.year)
            .bind(fields.owner_id)
            .fetch_optional(executor)
            .await
    }

    /// Count rows matching the plan, ignoring pagination.
    pub async fn count_matching(
        executor: impl PgExecutor<'_>,
        plan: &PropertyQuery,
    ) -> Result<i64, sqlx::Error> {
        let query = plan.count_sql();
        plan.bind_count(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(executor)
            .await
    }

    /// Fetch one page of listing rows matching the plan.
    pub async fn list_page(
        executor: impl PgExecutor<'_>,
        plan: &PropertyQuery,
        sort: PropertySort,
        page: PageRequest,
    ) -> Result<Vec<PropertyListItem>, sqlx::Error> {
        let query = plan.page_sql(sort);
        plan.bind_page(sqlx::query_as::<_, PropertyListItem>(&query), page)
            .fetch_all(executor)
            .await
    }
}
