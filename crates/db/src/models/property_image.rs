//! Property image entity model and DTOs.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `property_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PropertyImage {
    pub id: DbId,
    pub property_id: DbId,
    pub file_url: String,
    /// Only enabled images appear in listings.
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an image row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePropertyImage {
    pub property_id: DbId,
    pub file_url: String,
    /// Defaults to `true` if omitted.
    pub enabled: Option<bool>,
}
