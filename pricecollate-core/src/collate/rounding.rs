//! Two-decimal price rounding on `rust_decimal`.
//!
//! Prices arrive as `f64`. They are converted through their shortest decimal
//! representation (what the JSON carried), so `10.005` is rounded as the
//! decimal 10.005 and not as the binary value just below it.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places kept for every price column.
pub const PRICE_SCALE: u32 = 2;

/// Convert a float price to a decimal via its shortest round-trip text form.
///
/// Returns `None` for NaN, infinities, and magnitudes beyond `Decimal`'s range.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Round to the nearest value at `PRICE_SCALE`, halves away from zero.
pub fn round_to_scale(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round toward positive infinity at `PRICE_SCALE`.
pub fn ceil_to_scale(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::ToPositiveInfinity)
}

/// Round toward negative infinity at `PRICE_SCALE`.
pub fn floor_to_scale(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::ToNegativeInfinity)
}

/// Rounding rule for one OHLC column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRounding {
    /// Nearest, halves away from zero.
    Nearest,
    /// Ceiling: the shown value is never below the true value.
    Up,
    /// Floor: the shown value is never above the true value.
    Down,
}

impl FieldRounding {
    pub const OPEN: Self = Self::Nearest;
    pub const HIGH: Self = Self::Up;
    pub const LOW: Self = Self::Down;
    pub const CLOSE: Self = Self::Nearest;

    pub fn round(self, value: Decimal) -> Decimal {
        match self {
            Self::Nearest => round_to_scale(value),
            Self::Up => ceil_to_scale(value),
            Self::Down => floor_to_scale(value),
        }
    }

    /// Convert and round a float price; `None` if it cannot be represented.
    pub fn apply(self, value: f64) -> Option<Decimal> {
        to_decimal(value).map(|d| self.round(d))
    }
}
