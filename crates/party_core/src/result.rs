//! Per-turn results.

use serde::{Deserialize, Serialize};

use crate::events::HitKind;
use crate::party::CombatantId;
use crate::session::CombatOutcome;

/// What one status effect did at the start of the actor's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTickResult {
    /// Effect name.
    pub effect: String,
    /// Health actually changed (negative = damage).
    pub health_change: i32,
    /// Whether the effect ran out on this tick.
    pub expired: bool,
}

/// What an action did to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    /// Affected combatant.
    pub target: CombatantId,
    /// Target's display name.
    pub name: String,
    /// Damage or heal.
    pub kind: HitKind,
    /// Health actually removed or restored.
    pub amount: u32,
    /// Target health after the hit.
    pub remaining_health: u32,
    /// Whether the hit dropped the target to zero.
    pub defeated: bool,
    /// Name of the status effect attached by this hit.
    pub effect_applied: Option<String>,
}

/// Summary of one executed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    /// Round the turn was taken in.
    pub round: u32,
    /// Acting combatant.
    pub actor: CombatantId,
    /// Actor's display name.
    pub actor_name: String,
    /// Action performed; `None` when the actor fell to its own status effects.
    pub action_name: Option<String>,
    /// Whether the basic attack stood in for the selector's choice.
    pub used_fallback: bool,
    /// Status effects processed before acting.
    pub status_ticks: Vec<StatusTickResult>,
    /// Per-target outcomes, in resolution order.
    pub targets: Vec<TargetResult>,
    /// Human-readable lines describing the turn.
    pub summary: Vec<String>,
    /// Whether this turn ended the combat.
    pub is_final_turn: bool,
    /// Session outcome after the turn, if the combat is over.
    pub outcome: Option<CombatOutcome>,
}

impl CombatResult {
    /// Total damage dealt by the action.
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.sum_by_kind(HitKind::Damage)
    }

    /// Total healing done by the action.
    #[must_use]
    pub fn total_healing(&self) -> u32 {
        self.sum_by_kind(HitKind::Heal)
    }

    /// Targets defeated by the action.
    pub fn defeated(&self) -> impl Iterator<Item = &TargetResult> {
        self.targets.iter().filter(|t| t.defeated)
    }

    /// Summary lines joined with newlines.
    #[must_use]
    pub fn summary_text(&self) -> String {
        self.summary.join("\n")
    }

    fn sum_by_kind(&self, kind: HitKind) -> u32 {
        self.targets
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}
