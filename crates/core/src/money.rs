//! Monetary rounding and boundary coercion.
//!
//! All monetary amounts in the settlement subsystem are [`Decimal`] values
//! rounded to 2 decimal places with a half-up convention. Amounts pass
//! through [`round2`] at the point of computation and again at the point of
//! comparison, so two values derived along different paths never disagree by
//! representation noise.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// One cent, the smallest representable monetary unit.
#[must_use]
pub fn cent() -> Decimal {
    Decimal::new(1, 2)
}

/// Rounds a monetary amount to 2 decimal places, half-up.
///
/// Idempotent: `round2(round2(x)) == round2(x)` for all finite `x`.
#[must_use]
pub fn round2(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if `v` is below the rounding precision in magnitude.
///
/// Residue smaller than one cent is treated as zero by the suggester and the
/// allocation routines.
#[must_use]
pub fn is_negligible(v: Decimal) -> bool {
    v.abs() < cent()
}

/// Parses a monetary amount from untrusted request input.
///
/// Returns `None` for anything that is not a valid decimal number. Callers
/// reject the request instead of silently treating garbage as zero.
#[must_use]
pub fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}
