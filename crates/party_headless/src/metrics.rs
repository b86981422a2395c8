//! Battle metrics collection for balance analysis.
//!
//! [`MetricsCollector`] is an [`EventSink`]: it watches the engine's event
//! stream and tallies per-side numbers without touching the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use party_core::prelude::*;

/// Per-side tallies for one battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Party name.
    pub party: String,
    /// Damage dealt by actions (after clamping).
    pub damage_dealt: u64,
    /// Health restored by actions.
    pub healing_done: u64,
    /// Net health change from periodic effects on this side's members.
    pub periodic_delta: i64,
    /// Enemies defeated by this side's actions.
    pub kills: u32,
    /// Members of this side that fell.
    pub losses: u32,
    /// Actions used, including fallbacks.
    pub actions_used: u32,
    /// Chosen actions replaced by the basic attack.
    pub fallbacks: u32,
    /// Status effects this side applied.
    pub effects_applied: u32,
}

/// Complete metrics for a single battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleMetrics {
    /// Unique battle identifier.
    pub battle_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Round counter when the battle stopped.
    pub rounds: u32,
    /// Turns executed.
    pub turns: u32,
    /// Winning party name (None = mutual defeat or stall).
    pub winner: Option<String>,
    /// How the battle ended: `victory`, `mutual_defeat` or `stalled`.
    pub outcome: String,
    /// Player side tallies.
    pub player: SideMetrics,
    /// Enemy side tallies.
    pub enemy: SideMetrics,
    /// Final session hash (for determinism validation).
    pub final_state_hash: u64,
}

impl BattleMetrics {
    /// Create an empty metrics record.
    #[must_use]
    pub fn new(battle_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            battle_id: battle_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Tallies for `side`.
    #[must_use]
    pub fn side(&self, side: Side) -> &SideMetrics {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideMetrics {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Whether the battle ran out of rounds.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.outcome == "stalled"
    }
}

/// Event sink that builds [`BattleMetrics`].
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: BattleMetrics,
    actor: Option<CombatantId>,
}

impl MetricsCollector {
    /// Create a collector for one battle.
    #[must_use]
    pub fn new(battle_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: BattleMetrics::new(battle_id, scenario, seed),
            actor: None,
        }
    }

    /// Metrics gathered so far.
    #[must_use]
    pub fn current(&self) -> &BattleMetrics {
        &self.metrics
    }

    /// Close the record against the final session state.
    #[must_use]
    pub fn finalize(mut self, session: &CombatSession) -> BattleMetrics {
        self.metrics.rounds = session.round();
        self.metrics.final_state_hash = session.state_hash();
        self.metrics.winner = session
            .winner()
            .map(|side| session.party(side).name.clone());
        self.metrics.outcome = match session.outcome() {
            Some(CombatOutcome::Victory(_)) => "victory",
            Some(CombatOutcome::MutualDefeat) => "mutual_defeat",
            None => "stalled",
        }
        .to_string();
        self.metrics
    }
}

impl EventSink for MetricsCollector {
    fn on_event(&mut self, event: &CombatEvent) {
        let metrics = &mut self.metrics;
        match event {
            CombatEvent::CombatStarted {
                player_party,
                enemy_party,
                ..
            } => {
                metrics.player.party.clone_from(player_party);
                metrics.enemy.party.clone_from(enemy_party);
            }
            CombatEvent::EffectTicked {
                character, delta, ..
            } => {
                metrics.side_mut(character.side).periodic_delta += i64::from(*delta);
            }
            CombatEvent::DamageOrHealDealt {
                source,
                amount,
                kind,
                ..
            } => {
                let side = metrics.side_mut(source.side);
                match kind {
                    HitKind::Damage => side.damage_dealt += u64::from(*amount),
                    HitKind::Heal => side.healing_done += u64::from(*amount),
                }
            }
            CombatEvent::CharacterDefeated { character, by, .. } => {
                metrics.side_mut(character.side).losses += 1;
                if let Some(killer) = by {
                    metrics.side_mut(killer.side).kills += 1;
                }
            }
            CombatEvent::EffectApplied { .. } => {
                if let Some(actor) = self.actor {
                    metrics.side_mut(actor.side).effects_applied += 1;
                }
            }
            CombatEvent::ActionUsed {
                actor, fallback, ..
            } => {
                let side = metrics.side_mut(actor.side);
                side.actions_used += 1;
                if *fallback {
                    side.fallbacks += 1;
                }
            }
            CombatEvent::TurnStarted { actor, .. } => self.actor = Some(*actor),
            CombatEvent::TurnEnded { .. } => {
                metrics.turns += 1;
                self.actor = None;
            }
            CombatEvent::EffectExpired { .. }
            | CombatEvent::CombatEnded { .. } => {}
        }
    }
}

/// Summary statistics across multiple battles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total battles played.
    pub total_battles: u32,
    /// Battles won by each party.
    pub wins_by_party: BTreeMap<String, u32>,
    /// Win rates by party.
    pub win_rates: BTreeMap<String, f64>,
    /// Mutual defeats.
    pub draws: u32,
    /// Battles that hit the round limit.
    pub stalled: u32,
    /// Average rounds.
    pub avg_rounds: f64,
    /// Shortest battle in rounds.
    pub min_rounds: u32,
    /// Longest battle in rounds.
    pub max_rounds: u32,
    /// Average turns.
    pub avg_turns: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of battle metrics.
    #[must_use]
    pub fn from_battles(battles: &[BattleMetrics]) -> Self {
        if battles.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_battles: battles.len() as u32,
            min_rounds: u32::MAX,
            ..Default::default()
        };
        let mut rounds_sum = 0u64;
        let mut turns_sum = 0u64;

        for battle in battles {
            rounds_sum += u64::from(battle.rounds);
            turns_sum += u64::from(battle.turns);
            summary.min_rounds = summary.min_rounds.min(battle.rounds);
            summary.max_rounds = summary.max_rounds.max(battle.rounds);

            match &battle.winner {
                Some(winner) => *summary.wins_by_party.entry(winner.clone()).or_default() += 1,
                None if battle.is_stalled() => summary.stalled += 1,
                None => summary.draws += 1,
            }
        }

        let total = f64::from(summary.total_battles);
        summary.avg_rounds = rounds_sum as f64 / total;
        summary.avg_turns = turns_sum as f64 / total;
        for (party, wins) in &summary.wins_by_party {
            summary
                .win_rates
                .insert(party.clone(), f64::from(*wins) / total);
        }

        summary
    }

    /// Check if every party's win rate is within `threshold` of 0.5.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates
            .values()
            .all(|rate| (rate - 0.5).abs() <= threshold)
    }

    /// Get the dominant party (if any).
    #[must_use]
    pub fn dominant_party(&self, threshold: f64) -> Option<&String> {
        self.win_rates
            .iter()
            .find(|(_, rate)| **rate > 0.5 + threshold)
            .map(|(party, _)| party)
    }
}
