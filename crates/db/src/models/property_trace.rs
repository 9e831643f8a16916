//! Property trace (audit log) entity model and DTOs.
//!
//! Traces are append-only: there is no update DTO.

use estate_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Event name recorded for price changes.
pub const EVENT_PRICE_CHANGE: &str = "PRICE_CHANGE";

/// A row from the `property_traces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PropertyTrace {
    pub id: DbId,
    pub property_id: DbId,
    pub date_sale: Option<Timestamp>,
    pub name: String,
    pub value: Money,
    pub tax: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for appending a trace.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePropertyTrace {
    pub property_id: DbId,
    pub date_sale: Option<Timestamp>,
    /// Defaults to `PRICE_CHANGE` if omitted.
    pub name: Option<String>,
    pub value: Money,
    /// Defaults to 0 if omitted.
    pub tax: Option<Money>,
}

impl CreatePropertyTrace {
    /// Trace for a price change to `new_price`, with zero tax.
    pub fn price_change(property_id: DbId, new_price: Money) -> Self {
        Self {
            property_id,
            date_sale: None,
            name: Some(EVENT_PRICE_CHANGE.to_string()),
            value: new_price,
            tax: Some(Money::ZERO),
        }
    }
}
