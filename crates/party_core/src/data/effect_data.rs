//! Status effect snapshots.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};
use crate::stats::StatKind;
use crate::status::{EffectKind, StatusEffect};

/// Data-driven status effect.
///
/// `kind` is kept as text so unknown kinds surface as
/// [`CombatError::UnsupportedEffectKind`] instead of a generic parse error.
///
/// # Example RON
///
/// ```ron
/// StatusEffectData(
///     name: "Poison",
///     duration: 3,
///     kind: "DamageOverTime",
///     magnitude: 4,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectData {
    /// Effect name.
    pub name: String,
    /// Duration in rounds.
    pub duration: u32,
    /// `DamageOverTime`, `HealOverTime` or `StatModifier`.
    pub kind: String,
    /// Damage or heal per tick, or the stat delta.
    #[serde(default)]
    pub magnitude: i32,
    /// Modified stat, required for stat modifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<StatKind>,
}

impl StatusEffectData {
    /// Build a fresh effect instance.
    pub fn to_effect(&self) -> Result<StatusEffect> {
        let kind: EffectKind = self.kind.parse()?;
        match (kind, self.stat) {
            (EffectKind::StatModifier, None) => Err(CombatError::DataParseError {
                source_name: self.name.clone(),
                message: "stat modifier does not name a stat".to_string(),
            }),
            (EffectKind::StatModifier, Some(stat)) => Ok(StatusEffect::stat_modifier(
                self.name.clone(),
                self.duration,
                stat,
                self.magnitude,
            )),
            (EffectKind::DamageOverTime, _) => Ok(StatusEffect::damage_over_time(
                self.name.clone(),
                self.duration,
                self.magnitude,
            )),
            (EffectKind::HealOverTime, _) => Ok(StatusEffect::heal_over_time(
                self.name.clone(),
                self.duration,
                self.magnitude,
            )),
        }
    }
}

impl From<&StatusEffect> for StatusEffectData {
    fn from(effect: &StatusEffect) -> Self {
        Self {
            name: effect.name.clone(),
            duration: effect.remaining_rounds,
            kind: effect.kind.to_string(),
            magnitude: effect.magnitude,
            stat: effect.stat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(kind: &str, stat: Option<StatKind>) -> StatusEffectData {
        StatusEffectData {
            name: "Test".into(),
            duration: 2,
            kind: kind.into(),
            magnitude: 3,
            stat,
        }
    }

    #[test]
    fn test_unknown_kind_is_named() {
        let err = data("Petrify", None).to_effect().unwrap_err();
        assert_eq!(err, CombatError::UnsupportedEffectKind("Petrify".into()));
    }

    #[test]
    fn test_stat_modifier_requires_stat() {
        assert!(data("StatModifier", None).to_effect().is_err());
        let effect = data("StatModifier", Some(StatKind::Defense))
            .to_effect()
            .unwrap();
        assert_eq!(effect.stat_delta(), Some((StatKind::Defense, 3)));
    }

    #[test]
    fn test_parse_from_ron() {
        let text = r#"StatusEffectData(name: "Regen", duration: 3, kind: "HealOverTime", magnitude: 5)"#;
        let parsed: StatusEffectData = ron::from_str(text).unwrap();
        let effect = parsed.to_effect().unwrap();
        assert_eq!(effect.kind, EffectKind::HealOverTime);
        assert_eq!(effect.periodic_delta(), 5);
    }
}
