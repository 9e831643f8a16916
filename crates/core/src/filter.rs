//! Typed listing filter for properties.
//!
//! Each optional filter becomes one [`PropertyCondition`]. The query layer
//! folds the conditions into a conjunctive `WHERE` clause with bound
//! parameters; values never appear in SQL text.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::CoreError;
use crate::fields::non_blank;
use crate::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::sort::PropertySort;
use crate::types::{DbId, Money, Year};

/// Optional filters for the property listing. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    /// Substring matched against name, address, or internal code.
    pub text: Option<String>,
    pub owner_id: Option<DbId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    pub year: Option<Year>,
}

/// A single typed predicate over the `properties` table.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyCondition {
    /// Case-insensitive substring match on name, address, or internal code.
    /// Holds an escaped `ILIKE` pattern including the `%` wildcards.
    TextMatch(String),
    OwnerIs(DbId),
    PriceAtLeast(Money),
    PriceAtMost(Money),
    YearIs(Year),
}

impl PropertyFilter {
    /// Reject bounds that can never match anything meaningful.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (label, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(b) = bound {
                if b < Decimal::ZERO {
                    return Err(CoreError::InvalidArgument(format!(
                        "{label} must not be negative, got {b}"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(CoreError::InvalidArgument(format!(
                    "min_price ({min}) must not exceed max_price ({max})"
                )));
            }
        }
        Ok(())
    }

    /// Fold the present filters into conditions, in a fixed order.
    pub fn conditions(&self) -> Vec<PropertyCondition> {
        let mut conditions = Vec::new();

        if let Some(text) = non_blank(self.text.as_deref()) {
            conditions.push(PropertyCondition::TextMatch(contains_pattern(text.trim())));
        }
        if let Some(owner_id) = self.owner_id {
            conditions.push(PropertyCondition::OwnerIs(owner_id));
        }
        if let Some(min) = self.min_price {
            conditions.push(PropertyCondition::PriceAtLeast(min));
        }
        if let Some(max) = self.max_price {
            conditions.push(PropertyCondition::PriceAtMost(max));
        }
        if let Some(year) = self.year {
            conditions.push(PropertyCondition::YearIs(year));
        }

        conditions
    }

    /// Filter that matches only the given owner's properties.
    pub fn for_owner(owner_id: DbId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }
}

/// A listing request as received from a caller: filters, raw paging, sort.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyListRequest {
    #[serde(flatten)]
    pub filter: PropertyFilter,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub sort: Option<String>,
}

impl PropertyListRequest {
    pub fn new(filter: PropertyFilter, page: i64, page_size: i64) -> Self {
        Self {
            filter,
            page,
            page_size,
            sort: None,
        }
    }

    /// Validate filters, paging, and sort together.
    pub fn validate(&self) -> Result<(PageRequest, PropertySort), CoreError> {
        self.filter.validate()?;
        let page = PageRequest::new(self.page, self.page_size)?;
        let sort = PropertySort::from_token(self.sort.as_deref())?;
        Ok((page, sort))
    }
}

impl Default for PropertyListRequest {
    fn default() -> Self {
        Self::new(PropertyFilter::default(), default_page(), default_page_size())
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Escape `LIKE` metacharacters so `text` matches literally.
///
/// The escape character is the PostgreSQL default, `\`.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build a `%text%` pattern with `text` escaped.
fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
