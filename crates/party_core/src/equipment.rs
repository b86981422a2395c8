//! Gear definitions and the effective-stats projection.
//!
//! A [`GearCatalog`] is supplied by the gear collaborator and maps definition
//! identifiers to bonus values. Characters own [`GearInstance`]s (definition
//! id + upgrade level) keyed by slot. The catalog projects a character's base
//! stats plus every equipped bonus into [`EffectiveStats`].
//!
//! Upgrade scaling uses integer math: a bonus `b` at upgrade level `l` with a
//! step of `s` percent contributes `b * (100 + l * s) / 100`, floored per item.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::{CombatError, Result};
use crate::stats::EffectiveStats;

/// Equipment slot on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Main hand weapon.
    Weapon,
    /// Body armor.
    Armor,
    /// Head slot.
    Helmet,
    /// Ring, amulet or charm.
    Accessory,
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Armor => "armor",
            EquipmentSlot::Helmet => "helmet",
            EquipmentSlot::Accessory => "accessory",
        };
        f.write_str(name)
    }
}

/// Bonus values granted by one kind of gear.
///
/// # Example RON
///
/// ```ron
/// GearDefinition(
///     id: "iron_sword",
///     name: "Iron Sword",
///     slot: Weapon,
///     attack: 3,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearDefinition {
    /// Unique identifier referenced by [`GearInstance::definition_id`].
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slot the gear occupies.
    pub slot: EquipmentSlot,
    /// Attack bonus.
    #[serde(default)]
    pub attack: u32,
    /// Defense bonus.
    #[serde(default)]
    pub defense: u32,
    /// Maximum health bonus.
    #[serde(default)]
    pub health: u32,
    /// Critical chance bonus (percent).
    #[serde(default)]
    pub crit_chance: u32,
    /// Dodge chance bonus (percent).
    #[serde(default)]
    pub dodge_chance: u32,
}

impl GearDefinition {
    /// Create a definition with no bonuses.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, slot: EquipmentSlot) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slot,
            attack: 0,
            defense: 0,
            health: 0,
            crit_chance: 0,
            dodge_chance: 0,
        }
    }

    /// Builder method to set the attack bonus.
    #[must_use]
    pub fn with_attack(mut self, attack: u32) -> Self {
        self.attack = attack;
        self
    }

    /// Builder method to set the defense bonus.
    #[must_use]
    pub fn with_defense(mut self, defense: u32) -> Self {
        self.defense = defense;
        self
    }

    /// Builder method to set the health bonus.
    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    /// Builder method to set crit and dodge bonuses.
    #[must_use]
    pub fn with_chances(mut self, crit_chance: u32, dodge_chance: u32) -> Self {
        self.crit_chance = crit_chance;
        self.dodge_chance = dodge_chance;
        self
    }
}

/// A piece of gear owned by a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearInstance {
    /// Catalog identifier of the definition.
    pub definition_id: String,
    /// Upgrade level (0 = not upgraded).
    #[serde(default)]
    pub upgrade_level: u32,
}

impl GearInstance {
    /// Create an instance at upgrade level 0.
    #[must_use]
    pub fn new(definition_id: impl Into<String>) -> Self {
        Self {
            definition_id: definition_id.into(),
            upgrade_level: 0,
        }
    }

    /// Builder method to set the upgrade level.
    #[must_use]
    pub fn upgraded(mut self, level: u32) -> Self {
        self.upgrade_level = level;
        self
    }

    /// Upgrade multiplier in percent (100 = unscaled).
    #[must_use]
    pub fn upgrade_percent(&self, step_percent: u32) -> u32 {
        self.upgrade_level
            .saturating_mul(step_percent)
            .saturating_add(100)
    }

    /// Scale a raw bonus by this instance's upgrade multiplier, saturating at
    /// `u32::MAX`.
    #[must_use]
    pub fn scale(&self, bonus: u32, step_percent: u32) -> u32 {
        let scaled = u64::from(bonus) * u64::from(self.upgrade_percent(step_percent)) / 100;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

/// Lookup table of gear definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearCatalog {
    definitions: BTreeMap<String, GearDefinition>,
}

impl GearCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, definition: GearDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GearDefinition> {
        self.definitions.get(id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Equip an instance in the slot its definition names.
    ///
    /// Returns the instance previously in that slot.
    pub fn equip(
        &self,
        character: &mut Character,
        instance: GearInstance,
    ) -> Result<Option<GearInstance>> {
        let definition = self
            .get(&instance.definition_id)
            .ok_or_else(|| CombatError::UnknownGear(instance.definition_id.clone()))?;
        Ok(character.equipment.insert(definition.slot, instance))
    }

    /// Project a character's base stats plus all equipped bonuses.
    ///
    /// Status-effect stat modifiers are not included; see
    /// [`Character::modified_stats`].
    pub fn effective_stats(
        &self,
        character: &Character,
        upgrade_step_percent: u32,
    ) -> Result<EffectiveStats> {
        let base = character.stats;
        let mut stats = EffectiveStats {
            attack: base.strength,
            defense: 0,
            max_health: base.health,
            crit_chance: 0,
            dodge_chance: 0,
            dexterity: base.dexterity,
        };

        for instance in character.equipment.values() {
            let definition = self
                .get(&instance.definition_id)
                .ok_or_else(|| CombatError::UnknownGear(instance.definition_id.clone()))?;
            let scale = |bonus| instance.scale(bonus, upgrade_step_percent);

            stats.attack = stats.attack.saturating_add(scale(definition.attack));
            stats.defense = stats.defense.saturating_add(scale(definition.defense));
            stats.max_health = stats.max_health.saturating_add(scale(definition.health));
            stats.crit_chance = stats.crit_chance.saturating_add(scale(definition.crit_chance));
            stats.dodge_chance = stats.dodge_chance.saturating_add(scale(definition.dodge_chance));
        }

        Ok(stats)
    }
}

impl FromIterator<GearDefinition> for GearCatalog {
    fn from_iter<I: IntoIterator<Item = GearDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for definition in iter {
            catalog.insert(definition);
        }
        catalog
    }
}
