//! # Party Core
//!
//! Deterministic turn-based combat resolution for two opposing parties.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No global randomness (rolls come from an injected [`rng::RandomSource`])
//! - No floating-point math (multipliers are fixed-point)
//!
//! This separation enables:
//! - Exact replays from a seed and the selector's decisions
//! - Headless batch simulation
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`session`] - Combat session state machine and turn order
//! - [`engine`] - Turn execution and the damage formula
//! - [`selector`] - Pluggable action selection
//! - [`events`] - Observer event stream
//! - [`equipment`] - Gear catalog and effective stats
//! - [`data`] - Plain-data snapshots (RON)
//! - [`replay`] - Replay recording and verification
//!
//! ## Example
//!
//! ```
//! use party_core::prelude::*;
//!
//! let hero = Character::new("Aria", Role::Warrior, StatBlock::new(12, 9, 100));
//! let goblin = Character::new("Grik", Role::Rogue, StatBlock::new(8, 6, 40));
//! let player = Party::with_members("Heroes", [hero]).unwrap();
//! let enemy = Party::with_members("Goblins", [goblin]).unwrap();
//!
//! let mut engine =
//!     CombatEngine::new(CombatConfig::default(), GearCatalog::new(), SeededRandom::new(7)).unwrap();
//! let mut session = engine.create_session(player, enemy).unwrap();
//! engine
//!     .run_to_completion(&mut session, &mut BasicAttackSelector, 100)
//!     .unwrap();
//!
//! assert!(session.is_complete());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod character;
pub mod config;
pub mod data;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod events;
pub mod math;
pub mod party;
pub mod replay;
pub mod result;
pub mod rng;
pub mod selector;
pub mod session;
pub mod skill;
pub mod stats;
pub mod status;
pub mod targeting;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::character::Character;
    pub use crate::config::CombatConfig;
    pub use crate::engine::CombatEngine;
    pub use crate::equipment::{EquipmentSlot, GearCatalog, GearDefinition, GearInstance};
    pub use crate::error::{CombatError, Result};
    pub use crate::events::{CombatEvent, EventLog, EventSink, HitKind, NullSink};
    pub use crate::math::{from_percent, Fixed};
    pub use crate::party::{CombatantId, Party, Side, MAX_PARTY_SIZE};
    pub use crate::result::{CombatResult, StatusTickResult, TargetResult};
    pub use crate::rng::{RandomSource, SeededRandom};
    pub use crate::selector::{
        ActionSelector, BasicAttackSelector, FirstReadySelector, ScriptedSelector, SideSelectors,
    };
    pub use crate::session::{CombatOutcome, CombatSession, TurnOrder, TurnOrderEntry};
    pub use crate::skill::{ActionDefinition, CooldownTracker, TargetRule};
    pub use crate::stats::{EffectiveStats, Health, Role, StatBlock, StatKind};
    pub use crate::status::{EffectKind, StatusEffect};
}
