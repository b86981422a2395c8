//! Pluggable action selection.
//!
//! An [`ActionSelector`] is asked once per turn, after status effects have
//! ticked, which action the acting character should use. Returning `None`, or
//! an action that is still cooling down, makes the engine fall back to the
//! basic attack. Selectors read the session but can never mutate it.

use std::collections::VecDeque;

use crate::party::{CombatantId, Side};
use crate::session::CombatSession;
use crate::skill::{ActionDefinition, BASIC_ATTACK_NAME};
use crate::targeting::has_targets;

/// Strategy seam for choosing actions.
pub trait ActionSelector {
    /// Choose an action for `actor`, or `None` for the basic attack.
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition>;
}

impl<F> ActionSelector for F
where
    F: FnMut(CombatantId, &CombatSession) -> Option<ActionDefinition>,
{
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        self(actor, session)
    }
}

/// Always falls back to the basic attack.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAttackSelector;

impl ActionSelector for BasicAttackSelector {
    fn select_action(&mut self, _: CombatantId, _: &CombatSession) -> Option<ActionDefinition> {
        None
    }
}

/// Picks the first equipped action that is off cooldown and has targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstReadySelector;

impl ActionSelector for FirstReadySelector {
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        let character = session.character(actor)?;
        character
            .actions
            .iter()
            .find(|action| {
                character.can_use(action, session.round()) && has_targets(session, actor, action)
            })
            .cloned()
    }
}

/// Replays a recorded sequence of action names, one per call.
///
/// Names resolve against the actor's equipped actions; the basic attack name
/// resolves even when not equipped. An exhausted script yields `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSelector {
    script: VecDeque<Option<String>>,
}

impl ScriptedSelector {
    /// Create a selector from recorded choices.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Choices not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ActionSelector for ScriptedSelector {
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        let name = self.script.pop_front().flatten()?;
        let character = session.character(actor)?;
        match character.action(&name) {
            Some(action) => Some(action.clone()),
            None if name == BASIC_ATTACK_NAME => Some(ActionDefinition::basic_attack()),
            None => {
                tracing::warn!(actor = %actor, action = %name, "Scripted action is not equipped");
                None
            }
        }
    }
}

/// Dispatches to a different selector per side.
#[derive(Debug, Clone, Default)]
pub struct SideSelectors<P, E> {
    /// Selector for the player party.
    pub player: P,
    /// Selector for the enemy party.
    pub enemy: E,
}

impl<P, E> SideSelectors<P, E> {
    /// Pair two selectors.
    #[must_use]
    pub const fn new(player: P, enemy: E) -> Self {
        Self { player, enemy }
    }
}

impl<P: ActionSelector, E: ActionSelector> ActionSelector for SideSelectors<P, E> {
    fn select_action(
        &mut self,
        actor: CombatantId,
        session: &CombatSession,
    ) -> Option<ActionDefinition> {
        match actor.side {
            Side::Player => self.player.select_action(actor, session),
            Side::Enemy => self.enemy.select_action(actor, session),
        }
    }
}
