//! Monetary amounts as stored in `NUMERIC(12, 2)` columns.

use std::fmt;

use rust_decimal::Decimal;

/// Digits kept after the decimal point.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound for any stored amount (`10^10`).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Ways an amount fails to fit a money column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    TooPrecise,
    OutOfRange,
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooPrecise => write!(f, "has more than {MONEY_SCALE} decimal places"),
            Self::OutOfRange => write!(f, "must be less than {MONEY_LIMIT}"),
        }
    }
}

impl std::error::Error for AmountError {}

/// Check that `amount` survives a round trip through a money column.
///
/// Trailing zeros do not count towards the scale, so `1.500` is accepted.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use storefront::domain::money::{AmountError, check_amount};
///
/// assert_eq!(check_amount(Decimal::new(1999, 2)), Ok(()));
/// assert_eq!(check_amount(Decimal::new(333, 3)), Err(AmountError::TooPrecise));
/// ```
pub fn check_amount(amount: Decimal) -> Result<(), AmountError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AmountError::TooPrecise);
    }
    if amount.abs() >= MONEY_LIMIT {
        return Err(AmountError::OutOfRange);
    }
    Ok(())
}
