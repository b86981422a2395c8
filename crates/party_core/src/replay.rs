//! Replay recording and verification.
//!
//! A combat is fully determined by its initial session, the tuning config,
//! the gear catalog, the random seed and the selector's decisions. A
//! [`Replay`] stores exactly those, plus the final state hash, so playback
//! can prove it reached the same end state.
//!
//! **Note:** This module produces and consumes bytes only; file IO belongs
//! to the caller.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::engine::CombatEngine;
use crate::equipment::GearCatalog;
use crate::error::{CombatError, Result};
use crate::party::CombatantId;
use crate::rng::SeededRandom;
use crate::selector::{ActionSelector, ScriptedSelector};
use crate::session::CombatSession;
use crate::skill::ActionDefinition;

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One selector decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDecision {
    /// Round the decision was made in.
    pub round: u32,
    /// Acting combatant.
    pub actor: CombatantId,
    /// Chosen action name; `None` when the selector declined.
    pub action: Option<String>,
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario name.
    pub scenario_name: String,
    /// Seed for [`SeededRandom`].
    pub seed: u64,
    /// Serialized initial session (after creation).
    pub initial_session: Vec<u8>,
    /// Tuning constants in effect.
    pub config: CombatConfig,
    /// Gear catalog in effect.
    pub catalog: GearCatalog,
    /// Selector decisions in call order.
    pub decisions: Vec<ReplayDecision>,
    /// Number of executed turns.
    pub turns: u32,
    /// Round counter at the end of the recording.
    pub final_round: u32,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from a freshly created session.
    pub fn new(
        scenario_name: impl Into<String>,
        seed: u64,
        config: CombatConfig,
        catalog: GearCatalog,
        initial_session: &CombatSession,
    ) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_name: scenario_name.into(),
            seed,
            initial_session: initial_session.serialize()?,
            config,
            catalog,
            decisions: Vec::new(),
            turns: 0,
            final_round: initial_session.round(),
            final_hash: initial_session.state_hash(),
        })
    }

    /// Run a combat with `selector`, recording every decision.
    ///
    /// Stops when the combat ends or once `max_rounds` rounds have been
    /// played; a stalled combat still yields a valid replay. Returns the
    /// replay and the final session.
    pub fn record<A>(
        scenario_name: impl Into<String>,
        seed: u64,
        config: CombatConfig,
        catalog: GearCatalog,
        session: CombatSession,
        selector: &mut A,
        max_rounds: u32,
    ) -> Result<(Self, CombatSession)>
    where
        A: ActionSelector + ?Sized,
    {
        let mut replay = Self::new(scenario_name, seed, config, catalog.clone(), &session)?;
        let mut engine = CombatEngine::new(config, catalog, SeededRandom::new(seed))?;
        let mut session = session;
        let mut recorder = RecordingSelector::new(selector);

        while !session.is_complete() && session.round() <= max_rounds {
            engine.execute_turn(&mut session, &mut recorder)?;
            replay.turns += 1;
        }

        replay.decisions = recorder.into_decisions();
        replay.finalize(&session);
        tracing::info!(
            scenario = %replay.scenario_name,
            seed,
            turns = replay.turns,
            final_hash = replay.final_hash,
            "Replay recorded"
        );
        Ok((replay, session))
    }

    /// Record the end state.
    pub fn finalize(&mut self, session: &CombatSession) {
        self.final_round = session.round();
        self.final_hash = session.state_hash();
    }

    /// Restore the initial session.
    pub fn restore_initial_session(&self) -> Result<CombatSession> {
        CombatSession::deserialize(&self.initial_session)
    }

    /// Re-run the recorded combat and return the final session.
    pub fn play(&self) -> Result<CombatSession> {
        let mut session = self.restore_initial_session()?;
        let mut engine =
            CombatEngine::new(self.config, self.catalog.clone(), SeededRandom::new(self.seed))?;
        let mut selector =
            ScriptedSelector::new(self.decisions.iter().map(|decision| decision.action.clone()));

        for _ in 0..self.turns {
            if session.is_complete() {
                break;
            }
            engine.execute_turn(&mut session, &mut selector)?;
        }
        Ok(session)
    }

    /// Play back and check the final state hash.
    pub fn verify(&self) -> Result<CombatSession> {
        let session = self.play()?;
        let actual = session.state_hash();
        if actual != self.final_hash {
            return Err(CombatError::ReplayMismatch {
                expected: self.final_hash,
                actual,
            });
        }
        Ok(session)
    }

    /// Serialize the replay to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CombatError::InvalidState(format!("Failed to serialize replay: {e}")))
    }

    /// Deserialize a replay, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| CombatError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(CombatError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Number of recorded decisions.
    #[must_use]
    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }
}

/// Wraps a selector and records each decision it makes.
#[derive(Debug)]
pub struct RecordingSelector<'a, A: ?Sized> {
    inner: &'a mut A,
    decisions: Vec<ReplayDecision>,
}

impl<'a, A: ActionSelector + ?Sized> RecordingSelector<'a, A> {
    /// Wrap `inner`.
    pub fn new(inner: &'a mut A) -> Self {
        Self {
            inner,
            decisions: Vec::new(),
        }
    }

    /// Decisions recorded so far.
    #[must_use]
    pub fn decisions(&self) -> &[ReplayDecision] {
        &self.decisions
    }

    /// Consume the recorder, returning its decisions.
    #[must_use]
    pub fn into_decisions(self) -> Vec<ReplayDecision> {
        self.decisions
    }
}

impl<A: ActionSelector + ?Sized> ActionSelector for RecordingSelector<'_, A> {
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        let choice = self.inner.select_action(actor, session);
        self.decisions.push(ReplayDecision {
            round: session.round(),
            actor,
            action: choice.as_ref().map(|action| action.name.clone()),
        });
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::math::from_percent;
    use crate::party::Party;
    use crate::selector::FirstReadySelector;
    use crate::skill::TargetRule;
    use crate::stats::{Role, StatBlock};
    use crate::status::StatusEffect;

    fn session() -> CombatSession {
        let cleave = ActionDefinition::new("Cleave", TargetRule::AllEnemies, from_percent(80))
            .with_cooldown(2)
            .with_effect(StatusEffect::damage_over_time("Bleed", 2, 2));
        let hero = Character::new("Aria", Role::Warrior, StatBlock::new(12, 9, 90)).with_action(cleave);
        let goblins = (0..3).map(|i| {
            Character::new(format!("Goblin {i}"), Role::Rogue, StatBlock::new(8, 6 + i, 30))
        });
        CombatSession::new(
            Party::with_members("Heroes", [hero]).unwrap(),
            Party::with_members("Goblins", goblins).unwrap(),
        )
    }

    fn record() -> (Replay, CombatSession) {
        Replay::record(
            "skirmish",
            42,
            CombatConfig::default(),
            GearCatalog::new(),
            session(),
            &mut FirstReadySelector,
            100,
        )
        .unwrap()
    }

    #[test]
    fn test_replay_reproduces_final_state() {
        let (replay, session) = record();
        assert!(replay.turns > 0);
        assert_eq!(replay.final_hash, session.state_hash());
        let replayed = replay.verify().unwrap();
        assert_eq!(replayed, session);
    }

    #[test]
    fn test_bytes_round_trip() {
        let (replay, _) = record();
        let restored = Replay::from_bytes(&replay.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, replay);
    }

    #[test]
    fn test_tampered_seed_is_detected() {
        let (mut replay, _) = record();
        replay.seed += 1;
        match replay.verify() {
            Err(CombatError::ReplayMismatch { expected, .. }) => {
                assert_eq!(expected, replay.final_hash);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let (mut replay, _) = record();
        replay.version = REPLAY_VERSION + 1;
        assert!(Replay::from_bytes(&replay.to_bytes().unwrap()).is_err());
    }
}
