//! Replay recording to and from disk.

use std::path::Path;

use thiserror::Error;

use party_core::prelude::*;
use std::result::Result;
use party_core::replay::Replay;

use crate::scenario::{Scenario, ScenarioError};

/// Error type for replay files.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// File could not be read or written.
    #[error("Replay IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Recording, decoding or playback failed.
    #[error("Replay error: {0}")]
    Combat(#[from] CombatError),
    /// Scenario could not be built.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// Record one battle of `scenario` with the scenario's strategies.
///
/// Returns the replay and the final session.
pub fn record_scenario(
    scenario: &Scenario,
    seed: u64,
    max_rounds: u32,
) -> Result<(Replay, CombatSession), ReplayError> {
    let (player, enemy) = scenario.parties()?;
    let catalog = scenario.catalog();
    let session = CombatEngine::new(scenario.config, catalog.clone(), SeededRandom::new(seed))?
        .create_session(player, enemy)?;
    let mut selectors = SideSelectors::new(scenario.player_strategy, scenario.enemy_strategy);

    Ok(Replay::record(
        scenario.name.clone(),
        seed,
        scenario.config,
        catalog,
        session,
        &mut selectors,
        max_rounds,
    )?)
}

/// Write a replay file.
pub fn save_replay<P: AsRef<Path>>(replay: &Replay, path: P) -> Result<(), ReplayError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, replay.to_bytes()?)?;
    tracing::info!(path = %path.display(), decisions = replay.decision_count(), "Replay saved");
    Ok(())
}

/// Read a replay file.
pub fn load_replay<P: AsRef<Path>>(path: P) -> Result<Replay, ReplayError> {
    let bytes = std::fs::read(path)?;
    Ok(Replay::from_bytes(&bytes)?)
}
