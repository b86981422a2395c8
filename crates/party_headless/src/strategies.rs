//! Scripted action strategies for headless battles.
//!
//! A [`Strategy`] is plain data in a scenario file and an
//! [`ActionSelector`] at runtime. Every strategy only proposes actions that
//! are off cooldown and have at least one target, so a battle driven purely
//! by strategies never hits a targeting failure.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use party_core::prelude::*;
use std::result::Result;
use party_core::targeting::has_targets;

/// Heal threshold used when `support` is given on the command line.
pub const DEFAULT_HEAL_BELOW_PERCENT: u32 = 50;

/// Error type for strategy operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Name not recognized.
    #[error("Unknown strategy: {0} (expected basic, first_ready, aggressive or support)")]
    Unknown(String),
}

/// How a side picks its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Always the basic attack.
    Basic,
    /// First equipped action that is ready.
    #[default]
    FirstReady,
    /// Strongest ready damaging action.
    Aggressive,
    /// Heal when a living ally drops below the threshold, otherwise attack
    /// like [`Strategy::Aggressive`].
    Support {
        /// Health percentage (0-100) under which healing takes priority.
        heal_below_percent: u32,
    },
}

impl Strategy {
    /// Short name as used on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
            Strategy::FirstReady => "first_ready",
            Strategy::Aggressive => "aggressive",
            Strategy::Support { .. } => "support",
        }
    }
}

impl FromStr for Strategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Strategy::Basic),
            "first_ready" | "first-ready" | "default" => Ok(Strategy::FirstReady),
            "aggressive" | "aggro" => Ok(Strategy::Aggressive),
            "support" | "healer" => Ok(Strategy::Support {
                heal_below_percent: DEFAULT_HEAL_BELOW_PERCENT,
            }),
            other => Err(StrategyError::Unknown(other.to_string())),
        }
    }
}

impl ActionSelector for Strategy {
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        match *self {
            Strategy::Basic => None,
            Strategy::FirstReady => FirstReadySelector.select_action(actor, session),
            Strategy::Aggressive => strongest_attack(actor, session),
            Strategy::Support { heal_below_percent } => {
                if ally_needs_healing(actor, session, heal_below_percent) {
                    if let Some(heal) = ready_actions(actor, session).find(|a| a.is_healing()) {
                        return Some(heal.clone());
                    }
                }
                strongest_attack(actor, session)
            }
        }
    }
}

/// Actions of `actor` that are off cooldown and have targets, in equip order.
fn ready_actions<'a>(
    actor: CombatantId,
    session: &'a CombatSession,
) -> impl Iterator<Item = &'a ActionDefinition> + 'a {
    let round = session.round();
    session
        .character(actor)
        .into_iter()
        .flat_map(move |character| {
            character
                .actions
                .iter()
                .filter(move |action| character.can_use(action, round))
        })
        .filter(move |action| has_targets(session, actor, action))
}

/// Highest-multiplier damaging action; the earliest wins ties.
fn strongest_attack(actor: CombatantId, session: &CombatSession) -> Option<ActionDefinition> {
    ready_actions(actor, session)
        .filter(|action| !action.is_healing())
        .reduce(|best, action| {
            if action.multiplier > best.multiplier {
                action
            } else {
                best
            }
        })
        .cloned()
}

/// Whether a living ally other than `actor` is below `threshold` percent.
fn ally_needs_healing(actor: CombatantId, session: &CombatSession, threshold: u32) -> bool {
    session
        .party(actor.side)
        .alive_members()
        .filter(|(slot, _)| *slot != actor.slot)
        .any(|(_, member)| member.health().percentage() < threshold)
}
