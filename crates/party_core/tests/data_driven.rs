//! Battles built from RON party documents.

use party_core::data::{to_ron, PartyData};
use party_core::prelude::*;
use party_test_utils::fixtures::{fixed_engine, party_data, sample_catalog};

const HEROES: &str = r#"PartyData(
    name: "Heroes",
    members: [
        CharacterData(
            name: "Knight",
            role: Warrior,
            stats: StatBlock(strength: 12, dexterity: 5, health: 100),
            equipment: [
                GearItemData(id: "chain_mail"),
                GearItemData(id: "iron_helm", upgrade_level: 2),
            ],
        ),
    ],
)"#;

const RAIDERS: &str = r#"PartyData(
    name: "Raiders",
    members: [
        CharacterData(
            name: "Shaman",
            role: Cleric,
            stats: StatBlock(strength: 6, dexterity: 10, health: 100),
            skills: [
                SkillData(
                    name: "Sunder",
                    target: "SingleEnemy",
                    cooldown: 2,
                    effect: Some(StatusEffectData(
                        name: "Sundered",
                        duration: 2,
                        kind: "StatModifier",
                        magnitude: -12,
                        stat: Some(Defense),
                    )),
                ),
            ],
        ),
    ],
)"#;

fn parties() -> (Party, Party) {
    let catalog = sample_catalog();
    (
        party_data(HEROES).to_party(&catalog).unwrap(),
        party_data(RAIDERS).to_party(&catalog).unwrap(),
    )
}

#[test]
fn gear_from_data_raises_max_health() {
    let (heroes, raiders) = parties();
    let mut engine = fixed_engine(6);
    let session = engine.create_session(heroes, raiders).unwrap();

    let knight = session.character(CombatantId::new(Side::Player, 0)).unwrap();
    assert_eq!(knight.health().max(), 120);
    assert!(knight.health().is_full());

    let stats = engine.effective_stats(knight).unwrap();
    // chain_mail 8 + iron_helm 4 (4.8 at +20%, floored).
    assert_eq!(stats.defense, 12);
}

#[test]
fn defense_debuff_from_data_lowers_mitigation() {
    let (heroes, raiders) = parties();
    let knight = CombatantId::new(Side::Player, 0);
    let mut engine = fixed_engine(6);
    let mut session = engine.create_session(heroes, raiders).unwrap();

    let round_one = engine
        .execute_round(&mut session, &mut FirstReadySelector)
        .unwrap();
    let sunder = &round_one[0];
    assert_eq!(sunder.action_name.as_deref(), Some("Sunder"));
    // 6 + 6 - 12 / 4
    assert_eq!(sunder.targets[0].amount, 9);
    assert_eq!(sunder.targets[0].effect_applied.as_deref(), Some("Sundered"));

    let round_two = engine
        .execute_round(&mut session, &mut FirstReadySelector)
        .unwrap();
    let follow_up = &round_two[0];
    assert!(follow_up.used_fallback);
    assert_eq!(follow_up.targets[0].amount, 12);

    // Expired on the Knight's round-two tick.
    assert!(session.character(knight).unwrap().effects().is_empty());
    assert!(round_two[1]
        .status_ticks
        .iter()
        .any(|tick| tick.effect == "Sundered" && tick.expired));
}

#[test]
fn live_party_snapshots_back_to_data() {
    let (heroes, _) = parties();
    let snapshot = PartyData::from(&heroes);
    let text = to_ron(&snapshot).unwrap();

    let reloaded = party_data(&text).to_party(&sample_catalog()).unwrap();
    assert_eq!(reloaded, heroes);
}

#[test]
fn unknown_gear_in_data_is_rejected() {
    let text = HEROES.replace("iron_helm", "glass_helm");
    let err = party_data(&text).to_party(&sample_catalog()).unwrap_err();
    assert_eq!(err, CombatError::UnknownGear("glass_helm".into()));
}
