//! Combat engine: session setup and atomic turn execution.
//!
//! # Turn Pipeline
//!
//! Each call to [`CombatEngine::execute_turn`] runs, in order:
//!
//! 1. Preconditions (session active, someone scheduled to act)
//! 2. Status tick on the actor (periodic damage/heal, then expiry)
//! 3. Action choice via the [`ActionSelector`], falling back to the basic attack
//! 4. Target resolution against living members
//! 5. Per-target damage or healing, then effect application
//! 6. Cooldown bookkeeping and [`CombatSession::advance_turn`]
//!
//! Steps 1-4 can fail. Any failure restores the actor to its pre-turn state,
//! leaves the random source untouched and reports nothing to the sink, so a
//! failed call is indistinguishable from no call.
//!
//! # Damage Formula
//!
//! `roll(min..=max) + attack - defense / divisor`, scaled by `|multiplier|`
//! and rounded to the nearest integer. A negative multiplier heals. Damage is
//! floored at `min_damage`; healing is floored at zero.

use crate::character::Character;
use crate::config::CombatConfig;
use crate::equipment::GearCatalog;
use crate::error::{CombatError, Result};
use crate::events::{CombatEvent, EventSink, HitKind, NullSink};
use crate::math::{scale_round, stat_to_i32, Fixed};
use crate::party::{CombatantId, Party, Side};
use crate::result::{CombatResult, StatusTickResult, TargetResult};
use crate::rng::RandomSource;
use crate::selector::ActionSelector;
use crate::session::{CombatOutcome, CombatSession};
use crate::skill::ActionDefinition;
use crate::stats::EffectiveStats;
use crate::status::plan_tick;
use crate::targeting::require_targets;

/// Damage or healing computed for one target, before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Damage or heal.
    pub kind: HitKind,
    /// Magnitude before health clamping.
    pub amount: u32,
}

/// Apply the damage formula to one attacker/defender pair.
#[must_use]
pub fn compute_hit(
    config: &CombatConfig,
    roll: i32,
    attacker: &EffectiveStats,
    defender: &EffectiveStats,
    multiplier: Fixed,
) -> Hit {
    let mitigation = stat_to_i32(defender.defense) / config.defense_divisor;
    let raw = roll
        .saturating_add(stat_to_i32(attacker.attack))
        .saturating_sub(mitigation);
    let magnitude = scale_round(raw, multiplier.abs()).max(0) as u32;

    if multiplier < Fixed::ZERO {
        Hit {
            kind: HitKind::Heal,
            amount: magnitude,
        }
    } else {
        Hit {
            kind: HitKind::Damage,
            amount: magnitude.max(config.min_damage),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves combat turns.
///
/// Owns the tuning config, the gear catalog, the random source and an
/// optional event sink. Sessions are passed in by mutable reference so the
/// same engine can drive any number of them in sequence.
#[derive(Debug)]
pub struct CombatEngine<R, S = NullSink> {
    config: CombatConfig,
    catalog: GearCatalog,
    rng: R,
    sink: S,
}

impl<R: RandomSource> CombatEngine<R> {
    /// Create an engine with no event sink.
    ///
    /// Fails with [`CombatError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: CombatConfig, catalog: GearCatalog, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            rng,
            sink: NullSink,
        })
    }
}

impl<R: RandomSource, S: EventSink> CombatEngine<R, S> {
    /// Builder method to attach an event sink.
    #[must_use]
    pub fn with_sink<T: EventSink>(self, sink: T) -> CombatEngine<R, T> {
        CombatEngine {
            config: self.config,
            catalog: self.catalog,
            rng: self.rng,
            sink,
        }
    }

    /// Tuning constants.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Gear catalog used for effective stats.
    #[must_use]
    pub const fn catalog(&self) -> &GearCatalog {
        &self.catalog
    }

    /// Attached event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the event sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the engine, returning its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Gear projection plus active stat modifiers for `character`.
    pub fn effective_stats(&self, character: &Character) -> Result<EffectiveStats> {
        character.modified_stats(&self.catalog, self.config.upgrade_step_percent)
    }

    /// Start a combat between two parties.
    ///
    /// Every member's max health is set to its effective max health (a full
    /// bar stays full). Fails with [`CombatError::UnknownGear`] before any
    /// change if equipped gear is missing from the catalog.
    pub fn create_session(&mut self, mut player: Party, mut enemy: Party) -> Result<CombatSession> {
        let player_max = self.max_health_of(&player)?;
        let enemy_max = self.max_health_of(&enemy)?;
        for (member, max) in player.members_mut().zip(player_max) {
            member.set_max_health(max);
        }
        for (member, max) in enemy.members_mut().zip(enemy_max) {
            member.set_max_health(max);
        }

        let session = CombatSession::new(player, enemy);
        let combatants = (
            session.party(Side::Player).alive_count(),
            session.party(Side::Enemy).alive_count(),
        );

        tracing::info!(
            player = %session.party(Side::Player).name,
            enemy = %session.party(Side::Enemy).name,
            player_alive = combatants.0,
            enemy_alive = combatants.1,
            "Combat started"
        );

        self.sink.on_event(&CombatEvent::CombatStarted {
            player_party: session.party(Side::Player).name.clone(),
            enemy_party: session.party(Side::Enemy).name.clone(),
            combatants,
        });

        Ok(session)
    }

    fn max_health_of(&self, party: &Party) -> Result<Vec<u32>> {
        party
            .members()
            .iter()
            .map(|member| {
                self.catalog
                    .effective_stats(member, self.config.upgrade_step_percent)
                    .map(|stats| stats.max_health)
            })
            .collect()
    }

    /// Execute the current combatant's turn.
    ///
    /// # Errors
    ///
    /// - [`CombatError::SessionComplete`] if the session already has an outcome
    /// - [`CombatError::NoCurrentTurn`] if nobody is scheduled
    /// - [`CombatError::NoValidTargets`] if the chosen action has no targets
    ///
    /// Errors leave the session exactly as it was.
    pub fn execute_turn<A>(
        &mut self,
        session: &mut CombatSession,
        selector: &mut A,
    ) -> Result<CombatResult>
    where
        A: ActionSelector + ?Sized,
    {
        if session.is_complete() {
            return Err(CombatError::SessionComplete);
        }
        let actor = session
            .current_turn()
            .ok_or(CombatError::NoCurrentTurn)?
            .combatant;
        let round = session.round();
        let snapshot = session.require(actor)?.clone();
        let actor_name = snapshot.name.clone();

        let mut log = TurnLog::default();
        log.event(CombatEvent::TurnStarted { round, actor });
        let status_ticks = tick_effects(session.character_mut(actor)?, actor, round, &mut log);

        let plan = if session.require(actor)?.is_alive() {
            match self.plan_action(session, actor, round, selector) {
                Ok(plan) => Some(plan),
                Err(err) => {
                    *session.character_mut(actor)? = snapshot;
                    tracing::debug!(%actor, round, error = %err, "Turn rejected");
                    return Err(err);
                }
            }
        } else {
            log.event(CombatEvent::CharacterDefeated {
                round,
                character: actor,
                by: None,
            });
            log.line(format!("{actor_name} is defeated!"));
            None
        };

        let mut targets = Vec::new();
        if let Some(plan) = &plan {
            targets = self.commit_action(session, actor, round, plan, &mut log)?;
            log.event(CombatEvent::ActionUsed {
                round,
                actor,
                action: plan.action.name.clone(),
                fallback: plan.fallback,
            });
        }
        log.event(CombatEvent::TurnEnded { round, actor });

        session.advance_turn();

        let outcome = session.outcome();
        if let Some(outcome) = outcome {
            log.event(CombatEvent::CombatEnded {
                round: session.round(),
                outcome,
            });
            log.line(outcome_line(outcome, actor).to_string());
            tracing::info!(round = session.round(), ?outcome, "Combat ended");
        }

        #[cfg(feature = "debug-validation")]
        check_invariants(session)?;

        #[cfg(debug_assertions)]
        tracing::trace!(round, state_hash = session.state_hash(), "Session state hash");

        for event in &log.events {
            self.sink.on_event(event);
        }

        let action_name = plan.as_ref().map(|p| p.action.name.clone());
        tracing::debug!(
            %actor,
            round,
            action = action_name.as_deref().unwrap_or("-"),
            targets = targets.len(),
            "Turn executed"
        );

        Ok(CombatResult {
            round,
            actor,
            actor_name,
            action_name,
            used_fallback: plan.as_ref().is_some_and(|p| p.fallback),
            status_ticks,
            targets,
            summary: log.summary,
            is_final_turn: outcome.is_some(),
            outcome,
        })
    }

    /// Execute turns until the round counter advances or the combat ends.
    ///
    /// Each turn is atomic on its own; on error, turns already taken this
    /// round stay applied.
    pub fn execute_round<A>(
        &mut self,
        session: &mut CombatSession,
        selector: &mut A,
    ) -> Result<Vec<CombatResult>>
    where
        A: ActionSelector + ?Sized,
    {
        if session.is_complete() {
            return Err(CombatError::SessionComplete);
        }
        let round = session.round();
        let mut results = Vec::new();
        while !session.is_complete() && session.round() == round {
            results.push(self.execute_turn(session, selector)?);
        }
        Ok(results)
    }

    /// Execute rounds until the combat ends.
    ///
    /// Fails with [`CombatError::RoundLimitReached`] if the session is still
    /// active after `max_rounds` rounds.
    pub fn run_to_completion<A>(
        &mut self,
        session: &mut CombatSession,
        selector: &mut A,
        max_rounds: u32,
    ) -> Result<Vec<CombatResult>>
    where
        A: ActionSelector + ?Sized,
    {
        let mut results = Vec::new();
        while !session.is_complete() {
            if session.round() > max_rounds {
                tracing::warn!(max_rounds, "Combat stalled");
                return Err(CombatError::RoundLimitReached(max_rounds));
            }
            results.extend(self.execute_round(session, selector)?);
        }
        Ok(results)
    }

    // ========================================================================
    // Planning (no mutation)
    // ========================================================================

    fn plan_action<A>(
        &self,
        session: &CombatSession,
        actor: CombatantId,
        round: u32,
        selector: &mut A,
    ) -> Result<ActionPlan>
    where
        A: ActionSelector + ?Sized,
    {
        let character = session.require(actor)?;
        let (action, fallback) = match selector.select_action(actor, session) {
            Some(action) if character.can_use(&action, round) => (action, false),
            Some(action) => {
                tracing::debug!(%actor, action = %action.name, round, "Action on cooldown, using basic attack");
                (ActionDefinition::basic_attack(), true)
            }
            None => (ActionDefinition::basic_attack(), true),
        };

        let attacker = self.effective_stats(character)?;
        let targets = require_targets(session, actor, &action)?
            .into_iter()
            .map(|id| -> Result<(CombatantId, EffectiveStats)> {
                Ok((id, self.effective_stats(session.require(id)?)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ActionPlan {
            action,
            fallback,
            attacker,
            targets,
        })
    }

    // ========================================================================
    // Commit
    // ========================================================================

    fn commit_action(
        &mut self,
        session: &mut CombatSession,
        actor: CombatantId,
        round: u32,
        plan: &ActionPlan,
        log: &mut TurnLog,
    ) -> Result<Vec<TargetResult>> {
        let actor_name = session.require(actor)?.name.clone();
        let action = &plan.action;
        let mut results = Vec::with_capacity(plan.targets.len());

        for (target, defender) in &plan.targets {
            let roll = self
                .rng
                .roll(self.config.base_roll_min, self.config.base_roll_max);
            let hit = compute_hit(&self.config, roll, &plan.attacker, defender, action.multiplier);

            let character = session.character_mut(*target)?;
            let amount = match hit.kind {
                HitKind::Damage => character.take_damage(hit.amount),
                HitKind::Heal => character.heal(hit.amount),
            };
            let defeated = hit.kind == HitKind::Damage && !character.is_alive();

            tracing::trace!(
                %actor,
                %target,
                roll,
                attack = plan.attacker.attack,
                defense = defender.defense,
                computed = hit.amount,
                applied = amount,
                "Hit resolved"
            );

            results.push(TargetResult {
                target: *target,
                name: character.name.clone(),
                kind: hit.kind,
                amount,
                remaining_health: character.health().current(),
                defeated,
                effect_applied: None,
            });
        }

        for result in &results {
            log.event(CombatEvent::DamageOrHealDealt {
                round,
                source: actor,
                target: result.target,
                action: action.name.clone(),
                amount: result.amount,
                kind: result.kind,
            });
            log.line(match result.kind {
                HitKind::Damage => format!(
                    "{actor_name} uses {} on {} for {} damage.",
                    action.name, result.name, result.amount
                ),
                HitKind::Heal => format!(
                    "{actor_name} uses {} on {}, restoring {} health.",
                    action.name, result.name, result.amount
                ),
            });
        }

        for result in results.iter().filter(|r| r.defeated) {
            log.event(CombatEvent::CharacterDefeated {
                round,
                character: result.target,
                by: Some(actor),
            });
            log.line(format!("{} is defeated!", result.name));
        }

        if let (false, Some(effect)) = (plan.fallback, &action.applied_effect) {
            for result in &mut results {
                let character = session.character_mut(result.target)?;
                if !character.is_alive() {
                    continue;
                }
                character.apply_effect(effect.clone());
                result.effect_applied = Some(effect.name.clone());
                log.event(CombatEvent::EffectApplied {
                    round,
                    target: result.target,
                    effect: effect.name.clone(),
                    duration: effect.remaining_rounds,
                });
            }
        }

        if !plan.fallback {
            session
                .character_mut(actor)?
                .cooldowns
                .mark_used(&action.name, round);
        }

        Ok(results)
    }
}

/// Everything needed to commit an action, computed up front.
#[derive(Debug)]
struct ActionPlan {
    action: ActionDefinition,
    fallback: bool,
    attacker: EffectiveStats,
    targets: Vec<(CombatantId, EffectiveStats)>,
}

/// Events and summary lines buffered until the turn commits.
#[derive(Debug, Default)]
struct TurnLog {
    events: Vec<CombatEvent>,
    summary: Vec<String>,
}

impl TurnLog {
    fn event(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    fn line(&mut self, line: String) {
        self.summary.push(line);
    }
}

/// Tick every effect on `character` by one round.
fn tick_effects(
    character: &mut Character,
    id: CombatantId,
    round: u32,
    log: &mut TurnLog,
) -> Vec<StatusTickResult> {
    let plan = plan_tick(character.effects());
    let name = character.name.clone();
    let mut results: Vec<StatusTickResult> = Vec::new();

    for tick in &plan.periodic {
        // A character killed by one tick takes no further ticks.
        if !character.is_alive() {
            break;
        }
        let change = if tick.delta < 0 {
            -(character.take_damage(tick.delta.unsigned_abs()) as i32)
        } else {
            character.heal(tick.delta as u32) as i32
        };

        log.event(CombatEvent::EffectTicked {
            round,
            character: id,
            effect: tick.effect.clone(),
            delta: change,
        });
        log.line(if change < 0 {
            format!("{name} takes {} damage from {}.", -change, tick.effect)
        } else {
            format!("{name} recovers {change} health from {}.", tick.effect)
        });
        results.push(StatusTickResult {
            effect: tick.effect.clone(),
            health_change: change,
            expired: false,
        });
    }

    for effect in &plan.expired {
        log.event(CombatEvent::EffectExpired {
            round,
            character: id,
            effect: effect.clone(),
        });
        log.line(format!("{effect} wears off {name}."));
        match results.iter_mut().find(|r| &r.effect == effect) {
            Some(result) => result.expired = true,
            None => results.push(StatusTickResult {
                effect: effect.clone(),
                health_change: 0,
                expired: true,
            }),
        }
    }

    character.replace_effects(plan.remaining);
    results
}

/// Closing line judged from the actor's side.
fn outcome_line(outcome: CombatOutcome, actor: CombatantId) -> &'static str {
    match outcome {
        CombatOutcome::Victory(side) if side == actor.side => "Victory!",
        CombatOutcome::Victory(_) => "Defeat...",
        CombatOutcome::MutualDefeat => "Both parties have fallen.",
    }
}

#[cfg(feature = "debug-validation")]
fn check_invariants(session: &CombatSession) -> Result<()> {
    for (id, character) in session.combatants() {
        let health = character.health();
        if health.current() > health.max() {
            return Err(CombatError::InvalidState(format!(
                "{id} has {} health above max {}",
                health.current(),
                health.max()
            )));
        }
    }
    if let Some(entry) = session.current_turn() {
        if !session.is_complete() && !session.require(entry.combatant)?.is_alive() {
            return Err(CombatError::InvalidState(format!(
                "{} is scheduled but dead",
                entry.combatant
            )));
        }
    }
    Ok(())
}
