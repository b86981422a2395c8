//! Action (skill) definitions and cooldown tracking.
//!
//! An [`ActionDefinition`] is immutable and may be shared between any number
//! of characters. The only mutable piece of skill state, the round an action
//! was last used, lives in each character's [`CooldownTracker`].
//!
//! # Sign Convention
//!
//! A negative multiplier marks a healing action. The magnitude of the
//! multiplier scales the heal exactly as a positive multiplier scales damage.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CombatError;
use crate::math::{fixed_serde, Fixed};
use crate::status::StatusEffect;

/// Name used for the fallback action.
pub const BASIC_ATTACK_NAME: &str = "Attack";

/// Which characters an action affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRule {
    /// First living enemy in party order.
    SingleEnemy,
    /// Every living enemy.
    AllEnemies,
    /// First living ally other than the actor, in party order.
    SingleAlly,
    /// Every living ally other than the actor.
    AllAllies,
    /// The actor alone.
    SelfOnly,
}

impl TargetRule {
    /// Whether the rule selects members of the opposing party.
    #[must_use]
    pub const fn targets_enemies(self) -> bool {
        matches!(self, Self::SingleEnemy | Self::AllEnemies)
    }

    /// Canonical name as used in data files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleEnemy => "SingleEnemy",
            Self::AllEnemies => "AllEnemies",
            Self::SingleAlly => "SingleAlly",
            Self::AllAllies => "AllAllies",
            Self::SelfOnly => "Self",
        }
    }
}

impl fmt::Display for TargetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetRule {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SingleEnemy" | "single_enemy" | "enemy" => Ok(Self::SingleEnemy),
            "AllEnemies" | "all_enemies" => Ok(Self::AllEnemies),
            "SingleAlly" | "single_ally" | "ally" => Ok(Self::SingleAlly),
            "AllAllies" | "all_allies" => Ok(Self::AllAllies),
            "Self" | "SelfOnly" | "self" => Ok(Self::SelfOnly),
            other => Err(CombatError::UnsupportedTargetRule(other.to_string())),
        }
    }
}

/// Immutable definition of an action a character can take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique name, also the cooldown key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Targeting rule.
    pub target: TargetRule,
    /// Damage multiplier; negative values heal.
    #[serde(with = "fixed_serde")]
    pub multiplier: Fixed,
    /// Rounds that must elapse between uses.
    pub cooldown: u32,
    /// Effect attached to each target when the action lands.
    pub applied_effect: Option<StatusEffect>,
}

impl ActionDefinition {
    /// Create a new action with no cooldown and no effect payload.
    #[must_use]
    pub fn new(name: impl Into<String>, target: TargetRule, multiplier: Fixed) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            target,
            multiplier,
            cooldown: 0,
            applied_effect: None,
        }
    }

    /// The default action: multiplier 1.0, single enemy, no cooldown, no payload.
    #[must_use]
    pub fn basic_attack() -> Self {
        Self {
            name: BASIC_ATTACK_NAME.to_string(),
            description: "A plain weapon strike.".to_string(),
            target: TargetRule::SingleEnemy,
            multiplier: Fixed::ONE,
            cooldown: 0,
            applied_effect: None,
        }
    }

    /// Builder method to set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, rounds: u32) -> Self {
        self.cooldown = rounds;
        self
    }

    /// Builder method to set the applied status effect.
    #[must_use]
    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.applied_effect = Some(effect);
        self
    }

    /// Whether this action heals instead of damaging.
    #[must_use]
    pub fn is_healing(&self) -> bool {
        self.multiplier < Fixed::ZERO
    }
}

/// Per-character record of the round each action was last used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CooldownTracker {
    last_used: BTreeMap<String, u32>,
}

impl CooldownTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Round the named action was last used, if ever.
    #[must_use]
    pub fn last_used(&self, action: &str) -> Option<u32> {
        self.last_used.get(action).copied()
    }

    /// Usable iff never used, or `round - last_used >= cooldown`.
    #[must_use]
    pub fn can_use(&self, action: &ActionDefinition, round: u32) -> bool {
        match self.last_used(&action.name) {
            None => true,
            Some(last) => round.saturating_sub(last) >= action.cooldown,
        }
    }

    /// First round at which the action becomes usable again.
    #[must_use]
    pub fn ready_at(&self, action: &ActionDefinition) -> u32 {
        self.last_used(&action.name)
            .map_or(0, |last| last.saturating_add(action.cooldown))
    }

    /// Record a use of the named action.
    pub fn mark_used(&mut self, action: &str, round: u32) {
        self.last_used.insert(action.to_string(), round);
    }

    /// Forget all recorded uses.
    pub fn reset(&mut self) {
        self.last_used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::from_percent;

    #[test]
    fn test_never_used_is_usable() {
        let tracker = CooldownTracker::new();
        let nova = ActionDefinition::new("Nova", TargetRule::AllEnemies, Fixed::ONE).with_cooldown(5);
        assert!(tracker.can_use(&nova, 1));
    }

    #[test]
    fn test_cooldown_law() {
        let mut tracker = CooldownTracker::new();
        let cleave =
            ActionDefinition::new("Cleave", TargetRule::AllEnemies, Fixed::ONE).with_cooldown(2);

        tracker.mark_used("Cleave", 1);
        assert!(!tracker.can_use(&cleave, 1));
        assert!(!tracker.can_use(&cleave, 2));
        assert!(tracker.can_use(&cleave, 3));
        assert_eq!(tracker.ready_at(&cleave), 3);
    }

    #[test]
    fn test_zero_cooldown_usable_same_round() {
        let mut tracker = CooldownTracker::new();
        let jab = ActionDefinition::new("Jab", TargetRule::SingleEnemy, Fixed::ONE);
        tracker.mark_used("Jab", 4);
        assert!(tracker.can_use(&jab, 4));
    }

    #[test]
    fn test_ready_at_saturates() {
        let mut tracker = CooldownTracker::new();
        let ward =
            ActionDefinition::new("Ward", TargetRule::AllAllies, Fixed::ONE).with_cooldown(u32::MAX);
        tracker.mark_used("Ward", 10);
        assert_eq!(tracker.ready_at(&ward), u32::MAX);
        assert!(!tracker.can_use(&ward, u32::MAX - 1));
    }

    #[test]
    fn test_negative_multiplier_heals() {
        let mend = ActionDefinition::new("Mend", TargetRule::SingleAlly, from_percent(-100));
        assert!(mend.is_healing());
        assert!(!ActionDefinition::basic_attack().is_healing());
    }

    #[test]
    fn test_target_rule_parsing() {
        assert_eq!("AllAllies".parse::<TargetRule>().unwrap(), TargetRule::AllAllies);
        assert_eq!("self".parse::<TargetRule>().unwrap(), TargetRule::SelfOnly);

        let err = "RandomBystander".parse::<TargetRule>().unwrap_err();
        assert_eq!(err, CombatError::UnsupportedTargetRule("RandomBystander".into()));
    }

    #[test]
    fn test_basic_attack_shape() {
        let basic = ActionDefinition::basic_attack();
        assert_eq!(basic.name, BASIC_ATTACK_NAME);
        assert_eq!(basic.target, TargetRule::SingleEnemy);
        assert_eq!(basic.multiplier, Fixed::ONE);
        assert_eq!(basic.cooldown, 0);
        assert!(basic.applied_effect.is_none());
    }
}
