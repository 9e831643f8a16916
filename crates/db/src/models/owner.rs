//! Owner entity model and DTOs.

use chrono::NaiveDate;
use estate_core::storage::FileContent;
use estate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An owner row from the `owners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Owner {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    /// Location returned by the file store, never the photo content.
    pub photo_url: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating an owner through the service.
#[derive(Debug, Clone)]
pub struct CreateOwner {
    /// Unique business key.
    pub name: String,
    pub address: Option<String>,
    /// Stored via the file store as `photo_<name>.jpg` when present.
    pub photo: Option<FileContent>,
    pub birthday: Option<NaiveDate>,
}

/// Row values for inserting an owner once the photo has been stored.
#[derive(Debug, Clone)]
pub struct InsertOwner {
    pub name: String,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub birthday: Option<NaiveDate>,
}
