//! Error types for combat resolution.
//!
//! Errors fall into three groups:
//! - **Contract violations**: executing a turn on a finished session or an
//!   empty turn order, or naming a targeting rule the engine does not know.
//! - **Empty target sets**: the chosen action has nobody to affect. Callers
//!   (usually an AI selector) may retry with another action.
//! - **Data and setup errors**: full parties, unknown gear, bad config.
//!
//! Numeric clamps (health bounds, the damage floor) are never errors.

use thiserror::Error;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Top-level error type for all combat errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// A turn was requested on a session that already has an outcome.
    #[error("Combat session is already complete")]
    SessionComplete,

    /// The turn order has no entry to act.
    #[error("No combatant is scheduled to act")]
    NoCurrentTurn,

    /// The resolved target set for an action was empty.
    #[error("Action '{action}' has no valid targets for rule {rule}")]
    NoValidTargets {
        /// Name of the action that was attempted.
        action: String,
        /// Targeting rule that produced the empty set.
        rule: String,
    },

    /// A targeting rule name was not recognized.
    #[error("Unsupported targeting rule: {0}")]
    UnsupportedTargetRule(String),

    /// A status effect kind name was not recognized.
    #[error("Unsupported status effect kind: {0}")]
    UnsupportedEffectKind(String),

    /// A party already holds the maximum number of members.
    #[error("Party '{party}' is full (capacity {capacity})")]
    PartyFull {
        /// Party name.
        party: String,
        /// Maximum number of members.
        capacity: usize,
    },

    /// Equipped gear references a definition missing from the catalog.
    #[error("Unknown gear definition: {0}")]
    UnknownGear(String),

    /// A combatant reference does not point at a party member.
    #[error("Unknown combatant: {0}")]
    UnknownCombatant(String),

    /// A battle did not finish within the allowed number of rounds.
    #[error("Combat did not finish within {0} rounds")]
    RoundLimitReached(u32),

    /// Combat configuration is inconsistent.
    #[error("Invalid combat config: {0}")]
    InvalidConfig(String),

    /// Data snapshot parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// A replay did not reproduce the recorded final state.
    #[error("Replay mismatch: expected hash {expected}, got {actual}")]
    ReplayMismatch {
        /// Hash stored in the replay.
        expected: u64,
        /// Hash produced by playback.
        actual: u64,
    },

    /// Invalid combat state.
    #[error("Invalid combat state: {0}")]
    InvalidState(String),
}

impl CombatError {
    /// Whether a caller may recover by choosing a different action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoValidTargets { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_targets_are_recoverable() {
        let empty = CombatError::NoValidTargets {
            action: "Mend".into(),
            rule: "SingleAlly".into(),
        };
        assert!(empty.is_recoverable());
        assert!(!CombatError::SessionComplete.is_recoverable());
        assert!(!CombatError::UnsupportedTargetRule("Random".into()).is_recoverable());
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = CombatError::UnsupportedTargetRule("EveryoneEverywhere".into());
        assert!(err.to_string().contains("EveryoneEverywhere"));
    }
}
