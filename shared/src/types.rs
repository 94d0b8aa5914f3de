//! Common numeric helpers used across the platform

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Round to the given number of decimal places using banker's rounding.
///
/// Used only when presenting amounts (CSV export, statistics); the engine
/// keeps full precision internally.
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// `pct` percent of `amount`. Divides first when the product would not fit.
pub fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    match amount.checked_mul(pct) {
        Some(product) => product / Decimal::ONE_HUNDRED,
        None => (amount / Decimal::ONE_HUNDRED).saturating_mul(pct),
    }
}

/// Clamp a possibly negative amount to zero
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
