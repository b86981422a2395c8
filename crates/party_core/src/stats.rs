//! Character attributes and health.
//!
//! Stat blocks are pure data. Progression services raise them between
//! combats; during combat only [`Health`] changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Front-line melee fighter.
    #[default]
    Warrior,
    /// Fast striker.
    Rogue,
    /// Ranged damage dealer.
    Ranger,
    /// Spellcaster.
    Mage,
    /// Healer and support.
    Cleric,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Warrior => "Warrior",
            Role::Rogue => "Rogue",
            Role::Ranger => "Ranger",
            Role::Mage => "Mage",
            Role::Cleric => "Cleric",
        };
        f.write_str(name)
    }
}

/// Base numeric attributes of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatBlock {
    /// Contributes directly to attack.
    pub strength: u32,
    /// Orders turns within a round (higher acts first).
    pub dexterity: u32,
    /// Base maximum health before gear.
    pub health: u32,
}

impl StatBlock {
    /// Create a new stat block.
    #[must_use]
    pub const fn new(strength: u32, dexterity: u32, health: u32) -> Self {
        Self {
            strength,
            dexterity,
            health,
        }
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new(10, 10, 100)
    }
}

/// Current and maximum health.
///
/// `current` never exceeds `max`. A character is alive while `current > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    current: u32,
    /// Maximum health points.
    max: u32,
}

impl Health {
    /// Create health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Create health with an explicit current value, clamped to `max`.
    #[must_use]
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Current health points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Check if health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Check if at full health.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Apply damage, returning actual damage dealt.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Heal, returning actual amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current += actual;
        actual
    }

    /// Change the maximum. A full bar stays full; otherwise current is clamped.
    pub fn set_max(&mut self, max: u32) {
        let was_full = self.is_full();
        self.max = max;
        if was_full {
            self.current = max;
        } else {
            self.current = self.current.min(max);
        }
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (u64::from(self.current) * 100 / u64::from(self.max)) as u32
        }
    }
}

/// A stat that status effects can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Effective attack.
    Attack,
    /// Effective defense.
    Defense,
    /// Turn order stat.
    Dexterity,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::Dexterity => "dexterity",
        };
        f.write_str(name)
    }
}

/// Base stats plus all equipped-gear bonuses, plus active stat modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Strength plus gear attack bonuses.
    pub attack: u32,
    /// Gear defense bonuses.
    pub defense: u32,
    /// Base health plus gear health bonuses.
    pub max_health: u32,
    /// Critical chance in percent.
    pub crit_chance: u32,
    /// Dodge chance in percent.
    pub dodge_chance: u32,
    /// Turn order stat.
    pub dexterity: u32,
}

impl EffectiveStats {
    /// Add a signed modifier to one stat, clamping at zero.
    pub fn apply_modifier(&mut self, stat: StatKind, amount: i32) {
        let slot = match stat {
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Dexterity => &mut self.dexterity,
        };
        *slot = slot.saturating_add_signed(amount);
    }
}
