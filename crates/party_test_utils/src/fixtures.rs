//! Test fixtures and helpers.
//!
//! Pre-built characters, parties, gear and random sources for consistent
//! testing.

use std::collections::VecDeque;

use fixed::types::I32F32;
use party_core::data::PartyData;
use party_core::prelude::*;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real combat code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

// ============================================================================
// Random sources
// ============================================================================

/// Random source that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRoll(pub i32);

impl RandomSource for FixedRoll {
    fn roll(&mut self, _min: i32, _max: i32) -> i32 {
        self.0
    }
}

/// Random source that replays a sequence, repeating the last value forever.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    rolls: VecDeque<i32>,
    last: Option<i32>,
}

impl ScriptedRolls {
    /// Create from a roll sequence. An empty sequence rolls `min`.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            last: None,
        }
    }
}

impl RandomSource for ScriptedRolls {
    fn roll(&mut self, min: i32, _max: i32) -> i32 {
        if let Some(next) = self.rolls.pop_front() {
            self.last = Some(next);
        }
        self.last.unwrap_or(min)
    }
}

// ============================================================================
// Characters and parties
// ============================================================================

/// A warrior with explicit stats and no gear or actions.
#[must_use]
pub fn fighter(name: &str, strength: u32, dexterity: u32, health: u32) -> Character {
    Character::new(name, Role::Warrior, StatBlock::new(strength, dexterity, health))
}

/// A cleric that knows a single-ally heal.
#[must_use]
pub fn cleric(name: &str, dexterity: u32) -> Character {
    Character::new(name, Role::Cleric, StatBlock::new(6, dexterity, 80)).with_action(mend())
}

/// Full-strength single-ally heal.
#[must_use]
pub fn mend() -> ActionDefinition {
    ActionDefinition::new("Mend", TargetRule::SingleAlly, from_percent(-100))
        .with_description("Restores an ally's health.")
}

/// Area attack with a cooldown.
#[must_use]
pub fn cleave() -> ActionDefinition {
    ActionDefinition::new("Cleave", TargetRule::AllEnemies, from_percent(80))
        .with_description("Hits every enemy.")
        .with_cooldown(2)
}

/// Single-target attack that poisons.
#[must_use]
pub fn venom_strike(duration: u32) -> ActionDefinition {
    ActionDefinition::new("Venom Strike", TargetRule::SingleEnemy, fixed(1))
        .with_effect(StatusEffect::damage_over_time("Poison", duration, 3))
}

/// Build a party, panicking if it is oversized.
///
/// # Panics
///
/// Panics if more than [`MAX_PARTY_SIZE`] members are given.
#[must_use]
pub fn party(name: &str, members: impl IntoIterator<Item = Character>) -> Party {
    Party::with_members(name, members).expect("fixture party fits")
}

/// Two single-member parties.
#[must_use]
pub fn duel(hero: Character, foe: Character) -> (Party, Party) {
    (party("Heroes", [hero]), party("Foes", [foe]))
}

/// A small catalog covering every slot.
#[must_use]
pub fn sample_catalog() -> GearCatalog {
    [
        GearDefinition::new("short_sword", "Short Sword", EquipmentSlot::Weapon).with_attack(3),
        GearDefinition::new("war_axe", "War Axe", EquipmentSlot::Weapon)
            .with_attack(7)
            .with_chances(5, 0),
        GearDefinition::new("chain_mail", "Chain Mail", EquipmentSlot::Armor)
            .with_defense(8)
            .with_health(20),
        GearDefinition::new("iron_helm", "Iron Helm", EquipmentSlot::Helmet).with_defense(4),
        GearDefinition::new("lucky_charm", "Lucky Charm", EquipmentSlot::Accessory)
            .with_chances(3, 5),
    ]
    .into_iter()
    .collect()
}

/// Engine over [`FixedRoll`] with default config and the sample catalog.
///
/// # Panics
///
/// Never in practice; the default config always validates.
#[must_use]
pub fn fixed_engine(roll: i32) -> CombatEngine<FixedRoll> {
    CombatEngine::new(CombatConfig::default(), sample_catalog(), FixedRoll(roll))
        .expect("default config is valid")
}

/// Engine over [`SeededRandom`] with default config and the sample catalog.
///
/// # Panics
///
/// Never in practice; the default config always validates.
#[must_use]
pub fn seeded_engine(seed: u64) -> CombatEngine<SeededRandom> {
    CombatEngine::new(CombatConfig::default(), sample_catalog(), SeededRandom::new(seed))
        .expect("default config is valid")
}

/// A three-on-three skirmish with gear, cooldowns, heals and poison.
#[must_use]
pub fn skirmish() -> (Party, Party) {
    let catalog = sample_catalog();
    let mut knight = fighter("Knight", 12, 8, 120).with_action(cleave());
    catalog
        .equip(&mut knight, GearInstance::new("chain_mail").upgraded(1))
        .expect("fixture gear exists");
    let mut rogue = Character::new("Rogue", Role::Rogue, StatBlock::new(10, 14, 80))
        .with_action(venom_strike(3));
    catalog
        .equip(&mut rogue, GearInstance::new("short_sword"))
        .expect("fixture gear exists");
    let heroes = party("Heroes", [knight, rogue, cleric("Priest", 6)]);

    let mut brute = fighter("Brute", 14, 5, 110);
    catalog
        .equip(&mut brute, GearInstance::new("war_axe"))
        .expect("fixture gear exists");
    let raiders = party(
        "Raiders",
        [
            brute,
            fighter("Cutthroat", 9, 13, 70).with_action(venom_strike(2)),
            cleric("Shaman", 7),
        ],
    );

    (heroes, raiders)
}

/// Parse a [`PartyData`] document.
///
/// # Panics
///
/// Panics on malformed RON.
#[must_use]
pub fn party_data(text: &str) -> PartyData {
    ron::from_str(text).expect("fixture RON parses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_rolls_repeat_last() {
        let mut rolls = ScriptedRolls::new([6, 9]);
        assert_eq!(rolls.roll(5, 10), 6);
        assert_eq!(rolls.roll(5, 10), 9);
        assert_eq!(rolls.roll(5, 10), 9);
    }

    #[test]
    fn test_empty_script_rolls_min() {
        let mut rolls = ScriptedRolls::new(Vec::new());
        assert_eq!(rolls.roll(5, 10), 5);
    }

    #[test]
    fn test_skirmish_gear_resolves() {
        let (heroes, raiders) = skirmish();
        let catalog = sample_catalog();
        for member in heroes.members().iter().chain(raiders.members()) {
            assert!(catalog.effective_stats(member, 10).is_ok());
        }
    }
}
