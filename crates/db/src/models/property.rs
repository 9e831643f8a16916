//! Property entity model and DTOs.

use estate_core::fields::{resolve_text, resolve_value};
use estate_core::types::{DbId, Money, Timestamp, Year};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A property row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub name: String,
    pub address: String,
    /// Changed only through the price-change operation.
    pub price: Money,
    /// Unique business key.
    pub code_internal: String,
    pub year: Year,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A property as it appears in a listing, with one enabled image.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PropertyListItem {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub price: Money,
    pub code_internal: String,
    pub year: Year,
    pub owner_id: DbId,
    /// Enabled image with the lowest id, if any.
    pub image_url: Option<String>,
}

/// DTO for creating a new property.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProperty {
    pub name: String,
    pub address: String,
    pub price: Money,
    pub code_internal: String,
    pub year: Year,
    pub owner_id: DbId,
}

/// DTO for a partial update. Absent fields, and blank text, keep the stored
/// value. Price is not updatable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub address: Option<String>,
    pub year: Option<Year>,
    pub owner_id: Option<DbId>,
}

/// The four values a partial update writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPropertyFields {
    pub name: String,
    pub address: String,
    pub year: Year,
    pub owner_id: DbId,
}

impl UpdateProperty {
    /// Resolve each field against the stored row.
    pub fn resolve(&self, current: &Property) -> ResolvedPropertyFields {
        ResolvedPropertyFields {
            name: resolve_text(self.name.as_deref(), &current.name),
            address: resolve_text(self.address.as_deref(), &current.address),
            year: resolve_value(self.year, current.year),
            owner_id: resolve_value(self.owner_id, current.owner_id),
        }
    }
}
