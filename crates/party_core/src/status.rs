//! Timed status effects.
//!
//! Effects are owned by the character they afflict. At the start of that
//! character's own turn every effect ticks once: periodic effects deal or heal
//! their magnitude, then the remaining duration drops by one round. An effect
//! is removed the instant its duration reaches zero.
//!
//! Ticking is split into a pure planning step ([`plan_tick`]) and an apply
//! step performed by the engine, so a turn that fails its preconditions never
//! touches effect state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CombatError;
use crate::stats::StatKind;

/// What a status effect does while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Deals `magnitude` damage on each tick.
    DamageOverTime,
    /// Heals `magnitude` on each tick.
    HealOverTime,
    /// Adds `magnitude` (signed) to `stat` while active.
    StatModifier,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectKind::DamageOverTime => "DamageOverTime",
            EffectKind::HealOverTime => "HealOverTime",
            EffectKind::StatModifier => "StatModifier",
        };
        f.write_str(name)
    }
}

impl FromStr for EffectKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DamageOverTime" | "dot" | "damage_over_time" => Ok(Self::DamageOverTime),
            "HealOverTime" | "hot" | "heal_over_time" => Ok(Self::HealOverTime),
            "StatModifier" | "stat" | "stat_modifier" => Ok(Self::StatModifier),
            other => Err(CombatError::UnsupportedEffectKind(other.to_string())),
        }
    }
}

/// A timed modifier attached to a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Display name; also the identity used for refresh-on-reapply.
    pub name: String,
    /// Rounds remaining.
    pub remaining_rounds: u32,
    /// Effect behaviour.
    pub kind: EffectKind,
    /// Damage or heal per tick, or the stat delta for modifiers.
    pub magnitude: i32,
    /// Modified stat (stat modifiers only).
    pub stat: Option<StatKind>,
}

impl StatusEffect {
    /// Create a damage-over-time effect.
    #[must_use]
    pub fn damage_over_time(name: impl Into<String>, rounds: u32, damage: i32) -> Self {
        Self {
            name: name.into(),
            remaining_rounds: rounds,
            kind: EffectKind::DamageOverTime,
            magnitude: damage,
            stat: None,
        }
    }

    /// Create a heal-over-time effect.
    #[must_use]
    pub fn heal_over_time(name: impl Into<String>, rounds: u32, heal: i32) -> Self {
        Self {
            name: name.into(),
            remaining_rounds: rounds,
            kind: EffectKind::HealOverTime,
            magnitude: heal,
            stat: None,
        }
    }

    /// Create a stat modifier.
    #[must_use]
    pub fn stat_modifier(name: impl Into<String>, rounds: u32, stat: StatKind, amount: i32) -> Self {
        Self {
            name: name.into(),
            remaining_rounds: rounds,
            kind: EffectKind::StatModifier,
            magnitude: amount,
            stat: Some(stat),
        }
    }

    /// Whether the effect has run out.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_rounds == 0
    }

    /// Stat delta contributed while active, if this is a stat modifier.
    #[must_use]
    pub fn stat_delta(&self) -> Option<(StatKind, i32)> {
        match (self.kind, self.stat) {
            (EffectKind::StatModifier, Some(stat)) => Some((stat, self.magnitude)),
            _ => None,
        }
    }

    /// Health change produced by one tick: negative for damage, positive for heals.
    #[must_use]
    pub fn periodic_delta(&self) -> i32 {
        match self.kind {
            EffectKind::DamageOverTime => -self.magnitude.max(0),
            EffectKind::HealOverTime => self.magnitude.max(0),
            EffectKind::StatModifier => 0,
        }
    }
}

/// One periodic health change produced by a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTick {
    /// Name of the effect that ticked.
    pub effect: String,
    /// Signed health change (negative = damage).
    pub delta: i32,
}

/// The outcome of ticking a character's effects, computed without mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickPlan {
    /// Periodic health changes, in effect order.
    pub periodic: Vec<PeriodicTick>,
    /// Names of effects that reach zero duration on this tick.
    pub expired: Vec<String>,
    /// Effects that remain after the tick, durations decremented.
    pub remaining: Vec<StatusEffect>,
}

impl TickPlan {
    /// Net health change if every periodic tick applies.
    #[must_use]
    pub fn net_delta(&self) -> i32 {
        self.periodic.iter().map(|tick| tick.delta).sum()
    }
}

/// Compute the result of ticking `effects` by one round.
#[must_use]
pub fn plan_tick(effects: &[StatusEffect]) -> TickPlan {
    let mut plan = TickPlan::default();

    for effect in effects {
        let delta = effect.periodic_delta();
        if delta != 0 {
            plan.periodic.push(PeriodicTick {
                effect: effect.name.clone(),
                delta,
            });
        }

        let mut next = effect.clone();
        next.remaining_rounds = next.remaining_rounds.saturating_sub(1);
        if next.is_expired() {
            plan.expired.push(next.name);
        } else {
            plan.remaining.push(next);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_round_effect_expires_on_third_tick() {
        let mut effects = vec![StatusEffect::damage_over_time("Poison", 3, 2)];
        let mut expiries = 0;

        for tick in 1..=3 {
            let plan = plan_tick(&effects);
            expiries += plan.expired.len();
            effects = plan.remaining;
            if tick < 3 {
                assert_eq!(effects.len(), 1);
            }
        }

        assert!(effects.is_empty());
        assert_eq!(expiries, 1);
    }

    #[test]
    fn test_periodic_deltas() {
        let effects = vec![
            StatusEffect::damage_over_time("Burn", 2, 4),
            StatusEffect::heal_over_time("Renew", 2, 3),
            StatusEffect::stat_modifier("Guard", 2, StatKind::Defense, 5),
        ];
        let plan = plan_tick(&effects);
        assert_eq!(plan.periodic.len(), 2);
        assert_eq!(plan.periodic[0].delta, -4);
        assert_eq!(plan.periodic[1].delta, 3);
        assert_eq!(plan.net_delta(), -1);
        assert!(plan.expired.is_empty());
        assert!(plan.remaining.iter().all(|e| e.remaining_rounds == 1));
    }

    #[test]
    fn test_plan_does_not_mutate_input() {
        let effects = vec![StatusEffect::heal_over_time("Renew", 1, 3)];
        let plan = plan_tick(&effects);
        assert_eq!(plan.expired, vec!["Renew".to_string()]);
        assert_eq!(effects[0].remaining_rounds, 1);
    }

    #[test]
    fn test_stat_delta_only_for_modifiers() {
        let guard = StatusEffect::stat_modifier("Guard", 2, StatKind::Defense, 5);
        assert_eq!(guard.stat_delta(), Some((StatKind::Defense, 5)));
        assert_eq!(StatusEffect::damage_over_time("Burn", 2, 4).stat_delta(), None);
    }

    #[test]
    fn test_effect_kind_parsing() {
        assert_eq!("dot".parse::<EffectKind>().unwrap(), EffectKind::DamageOverTime);
        assert!(matches!(
            "Petrify".parse::<EffectKind>(),
            Err(CombatError::UnsupportedEffectKind(_))
        ));
    }
}
