//! Fixed-point math utilities for deterministic combat.
//!
//! Action multipliers and upgrade scaling use fixed-point arithmetic so a
//! replay produces bit-identical damage on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all combat math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Convert a percentage (e.g. `150` for 1.5x, `-50` for a half-strength heal)
/// into a fixed-point multiplier.
#[must_use]
pub fn from_percent(percent: i32) -> Fixed {
    Fixed::from_num(percent) / Fixed::from_num(100)
}

/// Scale an integer by a fixed-point factor, rounding to the nearest integer
/// (ties away from zero). Results outside the `i32` range saturate.
///
/// Decimal factors such as 1.2 are not exact in binary; rounding keeps
/// `20 * 1.2` at 24 instead of 23.
#[must_use]
pub fn scale_round(value: i32, factor: Fixed) -> i32 {
    Fixed::from_num(value)
        .saturating_mul(factor)
        .saturating_round()
        .saturating_to_num::<i32>()
}

/// Widen a `u32` stat into the signed damage domain, saturating at `i32::MAX`.
#[must_use]
pub fn stat_to_i32(stat: u32) -> i32 {
    i32::try_from(stat).unwrap_or(i32::MAX)
}
