//! Single-battle runner.
//!
//! Drives one scenario from session creation to an outcome (or the round
//! limit) with seeded rolls and the scenario's strategies, collecting
//! metrics through the engine's event stream.

use serde::Serialize;
use thiserror::Error;

use party_core::prelude::*;
use std::result::Result;

use crate::metrics::{BattleMetrics, MetricsCollector};
use crate::scenario::{Scenario, ScenarioError};

/// Error type for battle runs.
#[derive(Error, Debug)]
pub enum RunError {
    /// Scenario could not be loaded or built.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The engine rejected an operation.
    #[error("Combat error: {0}")]
    Combat(#[from] CombatError),
    /// Output could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Report could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Final state of one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatantStatus {
    /// Combatant id.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Current health.
    pub health: u32,
    /// Max health.
    pub max_health: u32,
}

/// Everything produced by one battle.
#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    /// Aggregated metrics.
    pub metrics: BattleMetrics,
    /// Every executed turn, in order.
    pub turns: Vec<CombatResult>,
    /// Final state of every combatant.
    pub roster: Vec<CombatantStatus>,
    /// Whether the battle reached an outcome before the round limit.
    pub completed: bool,
}

impl BattleReport {
    /// Summary lines of every turn, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.turns
            .iter()
            .flat_map(|turn| turn.summary.iter().map(String::as_str))
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run one battle of `scenario` with `seed`.
///
/// A battle still active after `max_rounds` rounds stops there and is
/// reported as stalled rather than failing.
pub fn run_battle(scenario: &Scenario, seed: u64, max_rounds: u32) -> Result<BattleReport, RunError> {
    let (player, enemy) = scenario.parties()?;
    let collector = MetricsCollector::new(&format!("battle_{seed}"), &scenario.name, seed);
    let mut engine = CombatEngine::new(scenario.config, scenario.catalog(), SeededRandom::new(seed))?
        .with_sink(collector);
    let mut session = engine.create_session(player, enemy)?;
    let mut selectors = SideSelectors::new(scenario.player_strategy, scenario.enemy_strategy);

    let mut turns = Vec::new();
    while !session.is_complete() && session.round() <= max_rounds {
        turns.push(engine.execute_turn(&mut session, &mut selectors)?);
    }

    let completed = session.is_complete();
    if !completed {
        tracing::warn!(scenario = %scenario.name, seed, max_rounds, "Battle stalled");
    }

    let roster = session
        .combatants()
        .map(|(id, character)| CombatantStatus {
            id,
            name: character.name.clone(),
            health: character.health().current(),
            max_health: character.health().max(),
        })
        .collect();
    let metrics = engine.into_sink().finalize(&session);

    tracing::debug!(
        scenario = %scenario.name,
        seed,
        rounds = metrics.rounds,
        winner = metrics.winner.as_deref().unwrap_or("-"),
        "Battle finished"
    );

    Ok(BattleReport {
        metrics,
        turns,
        roster,
        completed,
    })
}
