//! Combat tuning constants.
//!
//! The defaults are the damage contract: a base roll of 5-10 inclusive,
//! a quarter of effective defense subtracted, a floor of 1 damage per hit.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};

/// Inclusive lower bound of the base damage roll.
pub const DEFAULT_BASE_ROLL_MIN: i32 = 5;

/// Inclusive upper bound of the base damage roll.
pub const DEFAULT_BASE_ROLL_MAX: i32 = 10;

/// Effective defense is divided by this before being subtracted.
pub const DEFAULT_DEFENSE_DIVISOR: i32 = 4;

/// Minimum damage dealt by any non-healing hit.
pub const DEFAULT_MIN_DAMAGE: u32 = 1;

/// Percentage added to gear bonuses per upgrade level.
pub const DEFAULT_UPGRADE_STEP_PERCENT: u32 = 10;

/// Numeric configuration for the combat engine.
///
/// # Example RON
///
/// ```ron
/// CombatConfig(
///     base_roll_min: 5,
///     base_roll_max: 10,
///     defense_divisor: 4,
///     min_damage: 1,
///     upgrade_step_percent: 10,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Inclusive lower bound of the base roll.
    pub base_roll_min: i32,
    /// Inclusive upper bound of the base roll.
    pub base_roll_max: i32,
    /// Divisor applied to the target's effective defense (integer division).
    pub defense_divisor: i32,
    /// Damage floor for non-healing hits.
    pub min_damage: u32,
    /// Percent bonus per gear upgrade level.
    pub upgrade_step_percent: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_roll_min: DEFAULT_BASE_ROLL_MIN,
            base_roll_max: DEFAULT_BASE_ROLL_MAX,
            defense_divisor: DEFAULT_DEFENSE_DIVISOR,
            min_damage: DEFAULT_MIN_DAMAGE,
            upgrade_step_percent: DEFAULT_UPGRADE_STEP_PERCENT,
        }
    }
}

impl CombatConfig {
    /// Check that the configuration can drive the damage formula.
    pub fn validate(&self) -> Result<()> {
        if self.base_roll_min > self.base_roll_max {
            return Err(CombatError::InvalidConfig(format!(
                "base roll range is inverted: {}..={}",
                self.base_roll_min, self.base_roll_max
            )));
        }
        if self.defense_divisor <= 0 {
            return Err(CombatError::InvalidConfig(format!(
                "defense divisor must be positive, got {}",
                self.defense_divisor
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| CombatError::DataParseError {
            source_name: "combat config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CombatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = CombatConfig::from_ron_str("(base_roll_max: 12)").unwrap();
        assert_eq!(config.base_roll_min, DEFAULT_BASE_ROLL_MIN);
        assert_eq!(config.base_roll_max, 12);
        assert_eq!(config.defense_divisor, DEFAULT_DEFENSE_DIVISOR);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = CombatConfig::from_ron_str("(base_roll_min: 9, base_roll_max: 3)").unwrap_err();
        assert!(matches!(err, CombatError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_divisor() {
        let config = CombatConfig {
            defense_divisor: 0,
            ..CombatConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
