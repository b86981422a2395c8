//! Character snapshots.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::data::SkillData;
use crate::equipment::{GearCatalog, GearInstance};
use crate::error::Result;
use crate::stats::{Role, StatBlock};

/// One owned gear item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearItemData {
    /// Gear definition id.
    pub id: String,
    /// Upgrade level.
    #[serde(default)]
    pub upgrade_level: u32,
}

/// Data-driven character.
///
/// # Example RON
///
/// ```ron
/// CharacterData(
///     name: "Aria",
///     role: Warrior,
///     stats: StatBlock(strength: 12, dexterity: 8, health: 120),
///     equipment: [GearItemData(id: "iron_sword", upgrade_level: 1)],
///     skills: [SkillData(name: "Cleave", target: "AllEnemies", multiplier_percent: 80, cooldown: 2)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterData {
    /// Display name.
    pub name: String,
    /// Archetype.
    #[serde(default)]
    pub role: Role,
    /// Base attributes.
    #[serde(default)]
    pub stats: StatBlock,
    /// Progression level.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Progression experience.
    #[serde(default)]
    pub experience: u64,
    /// Current health; full when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_health: Option<u32>,
    /// Equipped gear. Later items replace earlier ones in the same slot.
    #[serde(default)]
    pub equipment: Vec<GearItemData>,
    /// Equipped actions, in preference order.
    #[serde(default)]
    pub skills: Vec<SkillData>,
}

const fn default_level() -> u32 {
    1
}

impl CharacterData {
    /// Build a live character, resolving gear slots through `catalog`.
    pub fn to_character(&self, catalog: &GearCatalog) -> Result<Character> {
        let mut character = Character::new(self.name.clone(), self.role, self.stats);
        character.level = self.level;
        character.experience = self.experience;
        if let Some(current) = self.current_health {
            character = character.with_current_health(current);
        }
        for item in &self.equipment {
            catalog.equip(
                &mut character,
                GearInstance::new(item.id.clone()).upgraded(item.upgrade_level),
            )?;
        }
        for skill in &self.skills {
            character = character.with_action(skill.to_action()?);
        }
        Ok(character)
    }
}

impl From<&Character> for CharacterData {
    fn from(character: &Character) -> Self {
        let health = character.health();
        Self {
            name: character.name.clone(),
            role: character.role,
            stats: character.stats,
            level: character.level,
            experience: character.experience,
            current_health: (!health.is_full()).then(|| health.current()),
            equipment: character
                .equipment
                .values()
                .map(|instance| GearItemData {
                    id: instance.definition_id.clone(),
                    upgrade_level: instance.upgrade_level,
                })
                .collect(),
            skills: character.actions.iter().map(SkillData::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{EquipmentSlot, GearDefinition};
    use crate::error::CombatError;

    fn catalog() -> GearCatalog {
        [GearDefinition::new("iron_sword", "Iron Sword", EquipmentSlot::Weapon).with_attack(3)]
            .into_iter()
            .collect()
    }

    const ARIA: &str = r#"CharacterData(
        name: "Aria",
        role: Warrior,
        stats: StatBlock(strength: 12, dexterity: 8, health: 120),
        current_health: Some(90),
        equipment: [GearItemData(id: "iron_sword", upgrade_level: 1)],
        skills: [SkillData(name: "Cleave", target: "AllEnemies", multiplier_percent: 80, cooldown: 2)],
    )"#;

    #[test]
    fn test_character_from_ron() {
        let data: CharacterData = ron::from_str(ARIA).unwrap();
        let aria = data.to_character(&catalog()).unwrap();

        assert_eq!(aria.level, 1);
        assert_eq!(aria.health().current(), 90);
        assert_eq!(aria.equipment[&EquipmentSlot::Weapon].upgrade_level, 1);
        assert_eq!(aria.action("Cleave").map(|a| a.cooldown), Some(2));
    }

    #[test]
    fn test_unknown_gear_rejected() {
        let mut data: CharacterData = ron::from_str(ARIA).unwrap();
        data.equipment.push(GearItemData {
            id: "mythril_crown".into(),
            upgrade_level: 0,
        });
        assert_eq!(
            data.to_character(&catalog()).unwrap_err(),
            CombatError::UnknownGear("mythril_crown".into())
        );
    }

    #[test]
    fn test_snapshot_of_live_character() {
        let data: CharacterData = ron::from_str(ARIA).unwrap();
        let aria = data.to_character(&catalog()).unwrap();
        assert_eq!(CharacterData::from(&aria), data);
    }
}
