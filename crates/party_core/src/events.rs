//! Combat event stream.
//!
//! The engine reports every meaningful occurrence as a [`CombatEvent`] pushed
//! into an [`EventSink`]. Sinks only observe: they receive shared references
//! and have no path back into resolution, so a combat resolves identically
//! with [`NullSink`], an [`EventLog`], or any closure.
//!
//! Per turn the order is: `TurnStarted`, `EffectTicked`*, `EffectExpired`*,
//! `DamageOrHealDealt`*, `CharacterDefeated`*, `EffectApplied`*,
//! `ActionUsed`, `TurnEnded`, then `CombatEnded` if the turn finished the
//! combat. `CombatStarted` is emitted once when a session is created.

use serde::{Deserialize, Serialize};

use crate::party::CombatantId;
use crate::session::CombatOutcome;

/// Whether a hit removed or restored health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// Health removed.
    Damage,
    /// Health restored.
    Heal,
}

/// Something that happened during combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A session was created.
    CombatStarted {
        /// Player party name.
        player_party: String,
        /// Enemy party name.
        enemy_party: String,
        /// Living combatants on each side (player, enemy).
        combatants: (usize, usize),
    },
    /// A character's turn began.
    TurnStarted {
        /// Round number.
        round: u32,
        /// Acting character.
        actor: CombatantId,
    },
    /// A periodic effect changed its owner's health.
    EffectTicked {
        /// Round number.
        round: u32,
        /// Afflicted character.
        character: CombatantId,
        /// Effect name.
        effect: String,
        /// Health actually changed (negative = damage).
        delta: i32,
    },
    /// An effect ran out and was removed.
    EffectExpired {
        /// Round number.
        round: u32,
        /// Character the effect was removed from.
        character: CombatantId,
        /// Effect name.
        effect: String,
    },
    /// An action hit a target.
    DamageOrHealDealt {
        /// Round number.
        round: u32,
        /// Acting character.
        source: CombatantId,
        /// Affected character.
        target: CombatantId,
        /// Action name.
        action: String,
        /// Health actually removed or restored.
        amount: u32,
        /// Damage or heal.
        kind: HitKind,
    },
    /// A character dropped to zero health.
    CharacterDefeated {
        /// Round number.
        round: u32,
        /// Defeated character.
        character: CombatantId,
        /// Character responsible, if any (`None` for effect ticks).
        by: Option<CombatantId>,
    },
    /// A status effect was attached.
    EffectApplied {
        /// Round number.
        round: u32,
        /// Character receiving the effect.
        target: CombatantId,
        /// Effect name.
        effect: String,
        /// Duration in rounds.
        duration: u32,
    },
    /// The actor used an action.
    ActionUsed {
        /// Round number.
        round: u32,
        /// Acting character.
        actor: CombatantId,
        /// Action name.
        action: String,
        /// Whether the default action stood in for the selector's choice.
        fallback: bool,
    },
    /// The actor's turn is over.
    TurnEnded {
        /// Round number.
        round: u32,
        /// Acting character.
        actor: CombatantId,
    },
    /// The combat reached its terminal state.
    CombatEnded {
        /// Round counter at completion.
        round: u32,
        /// Outcome.
        outcome: CombatOutcome,
    },
}

impl CombatEvent {
    /// Short stable name of the event kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            CombatEvent::CombatStarted { .. } => "combat_started",
            CombatEvent::TurnStarted { .. } => "turn_started",
            CombatEvent::EffectTicked { .. } => "effect_ticked",
            CombatEvent::EffectExpired { .. } => "effect_expired",
            CombatEvent::DamageOrHealDealt { .. } => "damage_or_heal_dealt",
            CombatEvent::CharacterDefeated { .. } => "character_defeated",
            CombatEvent::EffectApplied { .. } => "effect_applied",
            CombatEvent::ActionUsed { .. } => "action_used",
            CombatEvent::TurnEnded { .. } => "turn_ended",
            CombatEvent::CombatEnded { .. } => "combat_ended",
        }
    }
}

/// Observer of combat events.
pub trait EventSink {
    /// Receive one event.
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&CombatEvent),
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &CombatEvent) {}
}

/// Sink that records every event in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Labels of recorded events, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.iter().map(CombatEvent::label).collect()
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
    }
}
