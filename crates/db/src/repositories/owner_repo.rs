//! Repository for the `owners` table.

use estate_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::owner::{InsertOwner, Owner};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, photo_url, birthday, created_at, updated_at";

/// Provides insert and lookup operations for owners.
pub struct OwnerRepo;

impl OwnerRepo {
    /// Insert a new owner, returning the created row.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &InsertOwner,
    ) -> Result<Owner, sqlx::Error> {
        let query = format!(
            "INSERT INTO owners (name, address, photo_url, birthday)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Owner>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.photo_url)
            .bind(input.birthday)
            .fetch_one(executor)
            .await
    }

    /// Find an owner by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Owner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM owners WHERE id = $1");
        sqlx::query_as::<_, Owner>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Count owners with exactly this name.
    pub async fn count_by_name(
        executor: impl PgExecutor<'_>,
        name: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM owners WHERE name = $1")
            .bind(name)
            .fetch_one(executor)
            .await
    }

    /// Total number of owners.
    pub async fn count(executor: impl PgExecutor<'_>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM owners")
            .fetch_one(executor)
            .await
    }
}
