//! Repository for the `property_images` table.
//!
//! Images are append-only from the service's point of view.

use estate_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::property_image::{CreatePropertyImage, PropertyImage};

const COLUMNS: &str = "id, property_id, file_url, enabled, created_at, updated_at";

/// Provides insert and query operations for property images.
pub struct PropertyImageRepo;

impl PropertyImageRepo {
    /// Insert an image row. `enabled` defaults to `true`.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreatePropertyImage,
    ) -> Result<PropertyImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO property_images (property_id, file_url, enabled)
             VALUES ($1, $2, COALESCE($3, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PropertyImage>(&query)
            .bind(input.property_id)
            .bind(&input.file_url)
            .bind(input.enabled)
            .fetch_one(executor)
            .await
    }

    /// List a property's images, oldest first.
    pub async fn list_for_property(
        executor: impl PgExecutor<'_>,
        property_id: DbId,
        include_disabled: bool,
    ) -> Result<Vec<PropertyImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM property_images
             WHERE property_id = $1 AND (enabled OR $2)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, PropertyImage>(&query)
            .bind(property_id)
            .bind(include_disabled)
            .fetch_all(executor)
            .await
    }
}
