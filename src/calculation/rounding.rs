//! Currency rounding policy.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to whole currency units, halves away from zero.
///
/// Every `round` in the payroll rules goes through this function, so the
/// policy is applied identically by every calculator.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("157.5").unwrap()), Decimal::from(158));
/// assert_eq!(round_currency(Decimal::from_str("408.33").unwrap()), Decimal::from(408));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
