//! Action snapshots.

use serde::{Deserialize, Serialize};

use crate::data::StatusEffectData;
use crate::error::Result;
use crate::math::{from_percent, Fixed};
use crate::skill::{ActionDefinition, TargetRule};

/// Data-driven action definition.
///
/// The multiplier is written as a whole percentage (`150` = 1.5x, `-100` =
/// heal at full strength) so data files never carry raw fixed-point bits.
///
/// # Example RON
///
/// ```ron
/// SkillData(
///     name: "Cleave",
///     description: "Hits every enemy.",
///     target: "AllEnemies",
///     multiplier_percent: 80,
///     cooldown: 2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillData {
    /// Unique action name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Targeting rule name.
    pub target: String,
    /// Multiplier in percent; negative heals.
    #[serde(default = "default_multiplier_percent")]
    pub multiplier_percent: i32,
    /// Rounds between uses.
    #[serde(default)]
    pub cooldown: u32,
    /// Effect attached to each target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<StatusEffectData>,
}

const fn default_multiplier_percent() -> i32 {
    100
}

impl SkillData {
    /// Build the live action definition.
    ///
    /// Fails with [`crate::error::CombatError::UnsupportedTargetRule`] on an
    /// unknown rule name.
    pub fn to_action(&self) -> Result<ActionDefinition> {
        let target: TargetRule = self.target.parse()?;
        let mut action = ActionDefinition::new(
            self.name.clone(),
            target,
            from_percent(self.multiplier_percent),
        )
        .with_description(self.description.clone())
        .with_cooldown(self.cooldown);
        if let Some(effect) = &self.effect {
            action = action.with_effect(effect.to_effect()?);
        }
        Ok(action)
    }
}

impl From<&ActionDefinition> for SkillData {
    fn from(action: &ActionDefinition) -> Self {
        Self {
            name: action.name.clone(),
            description: action.description.clone(),
            target: action.target.as_str().to_string(),
            multiplier_percent: (action.multiplier * Fixed::from_num(100))
                .round()
                .to_num::<i32>(),
            cooldown: action.cooldown,
            effect: action.applied_effect.as_ref().map(StatusEffectData::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CombatError;

    #[test]
    fn test_unknown_target_rule() {
        let skill = SkillData {
            name: "Chain Lightning".into(),
            description: String::new(),
            target: "Bounce".into(),
            multiplier_percent: 100,
            cooldown: 0,
            effect: None,
        };
        assert_eq!(
            skill.to_action().unwrap_err(),
            CombatError::UnsupportedTargetRule("Bounce".into())
        );
    }

    #[test]
    fn test_parse_with_defaults() {
        let text = r#"SkillData(name: "Smite", target: "SingleEnemy")"#;
        let skill: SkillData = ron::from_str(text).unwrap();
        let action = skill.to_action().unwrap();
        assert_eq!(action.multiplier, Fixed::ONE);
        assert_eq!(action.cooldown, 0);
        assert!(action.applied_effect.is_none());
    }

    #[test]
    fn test_heal_percent_survives_snapshot() {
        let action = ActionDefinition::new("Mend", TargetRule::SingleAlly, from_percent(-120));
        let snapshot = SkillData::from(&action);
        assert_eq!(snapshot.multiplier_percent, -120);
        assert_eq!(snapshot.target, "SingleAlly");
        assert!(snapshot.to_action().unwrap().is_healing());
    }
}
