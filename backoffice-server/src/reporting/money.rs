//! Decimal helpers
//!
//! Ledger arithmetic runs on `rust_decimal` and converts back to f64
//! only at the response boundary. Percentages round where the report
//! displays them (never inside the balance math).

use rust_decimal::prelude::*;

/// Convert f64 to Decimal for calculation
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for responses. No rounding: balances
/// stay exact until display formatting.
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Percentage of `part` over `whole`, rounded half-up to `dp` places.
/// Zero denominator resolves to 0 by policy, never a panic.
pub(crate) fn pct_of(part: Decimal, whole: Decimal, dp: u32) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    let pct = part / whole * Decimal::ONE_HUNDRED;
    to_f64(pct.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}
