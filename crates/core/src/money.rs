//! Money normalization for `NUMERIC(18,2)` columns.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CoreError;
use crate::types::Money;

/// Decimal places kept by money columns.
pub const MONEY_SCALE: u32 = 2;

/// Largest absolute value a `NUMERIC(18,2)` column holds, exclusive.
const MONEY_LIMIT: Decimal = Decimal::from_parts(1_874_919_424, 2_328_306, 0, false, 0); // 10^16

/// Round to the column scale the way PostgreSQL does (half away from zero).
pub fn normalize(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate and normalize a price: non-negative and within column range.
pub fn validate_price(amount: Money) -> Result<Money, CoreError> {
    let normalized = normalize(amount);
    if normalized.is_sign_negative() && !normalized.is_zero() {
        return Err(CoreError::InvalidArgument(format!(
            "price must not be negative, got {amount}"
        )));
    }
    if normalized >= MONEY_LIMIT {
        return Err(CoreError::InvalidArgument(format!(
            "price {amount} exceeds the supported range"
        )));
    }
    Ok(normalized)
}
