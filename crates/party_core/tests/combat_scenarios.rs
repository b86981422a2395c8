//! End-to-end combat scenarios.
//!
//! Each test drives a real engine through the public API with fixture
//! characters and a fixed or scripted random source.

use party_core::prelude::*;
use party_test_utils::fixtures::{
    cleave, cleric, duel, fighter, fixed_engine, mend, party, sample_catalog, venom_strike,
};

fn combatant(side: Side, slot: usize) -> CombatantId {
    CombatantId::new(side, slot)
}

// =============================================================================
// Damage resolution
// =============================================================================

#[test]
fn gear_attack_adds_to_strength() {
    let mut hero = fighter("Aria", 10, 12, 100);
    sample_catalog()
        .equip(&mut hero, GearInstance::new("short_sword"))
        .unwrap();
    let (player, enemy) = duel(hero, fighter("Dummy", 1, 5, 100));

    let mut engine = fixed_engine(7);
    let mut session = engine.create_session(player, enemy).unwrap();
    let result = engine
        .execute_turn(&mut session, &mut BasicAttackSelector)
        .unwrap();

    assert_eq!(result.actor, combatant(Side::Player, 0));
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].amount, 20);
    assert_eq!(result.targets[0].remaining_health, 80);
    assert_eq!(
        session
            .character(combatant(Side::Enemy, 0))
            .unwrap()
            .health()
            .current(),
        80
    );
    assert_eq!(result.summary, vec!["Aria uses Attack on Dummy for 20 damage."]);
}

#[test]
fn lethal_hit_ends_combat() {
    let (player, enemy) = duel(fighter("Aria", 10, 12, 100), fighter("Grik", 4, 5, 15));

    let mut engine = fixed_engine(7);
    let mut session = engine.create_session(player, enemy).unwrap();
    let result = engine
        .execute_turn(&mut session, &mut BasicAttackSelector)
        .unwrap();

    assert!(result.targets[0].defeated);
    assert!(result.is_final_turn);
    assert_eq!(result.outcome, Some(CombatOutcome::Victory(Side::Player)));
    assert!(session.is_complete());
    assert_eq!(session.winner(), Some(Side::Player));
    assert_eq!(result.summary.last().map(String::as_str), Some("Victory!"));

    let hash = session.state_hash();
    assert_eq!(
        engine.execute_turn(&mut session, &mut BasicAttackSelector),
        Err(CombatError::SessionComplete)
    );
    assert_eq!(session.state_hash(), hash);
}

#[test]
fn area_attack_hits_every_living_enemy() {
    let hero = fighter("Aria", 10, 12, 100).with_action(cleave());
    let foes = party(
        "Goblins",
        [
            fighter("Grik", 4, 5, 60),
            fighter("Snag", 4, 4, 60).with_current_health(0),
            fighter("Mott", 4, 3, 60),
        ],
    );

    let mut engine = fixed_engine(10);
    let mut session = engine.create_session(party("Heroes", [hero]), foes).unwrap();
    let result = engine
        .execute_turn(&mut session, &mut FirstReadySelector)
        .unwrap();

    assert_eq!(result.action_name.as_deref(), Some("Cleave"));
    let hit: Vec<CombatantId> = result.targets.iter().map(|t| t.target).collect();
    assert_eq!(
        hit,
        vec![combatant(Side::Enemy, 0), combatant(Side::Enemy, 2)]
    );
    // (10 + 10) * 0.8
    assert!(result.targets.iter().all(|t| t.amount == 16));
}

// =============================================================================
// Cooldowns
// =============================================================================

#[test]
fn cooldown_blocks_the_next_round_only() {
    let hero = fighter("Aria", 10, 12, 100).with_action(cleave());
    let (player, enemy) = duel(hero, fighter("Golem", 1, 1, 1000));
    let aria = combatant(Side::Player, 0);

    let mut engine = fixed_engine(5);
    let mut session = engine.create_session(player, enemy).unwrap();
    let always_cleave = |_: CombatantId, _: &CombatSession| Some(cleave());
    let mut selector = SideSelectors::new(always_cleave, BasicAttackSelector);

    let first = engine.execute_round(&mut session, &mut selector).unwrap();
    assert!(!first[0].used_fallback);
    assert_eq!(first[0].action_name.as_deref(), Some("Cleave"));

    let hero = session.character(aria).unwrap();
    assert!(!hero.can_use(&cleave(), 2));
    assert!(hero.can_use(&cleave(), 3));

    let second = engine.execute_round(&mut session, &mut selector).unwrap();
    assert!(second[0].used_fallback);
    assert_eq!(second[0].action_name.as_deref(), Some("Attack"));

    let third = engine.execute_round(&mut session, &mut selector).unwrap();
    assert!(!third[0].used_fallback);
    assert_eq!(
        session.character(aria).unwrap().cooldowns.last_used("Cleave"),
        Some(3)
    );
}

// =============================================================================
// Targeting failures
// =============================================================================

#[test]
fn lone_healer_has_no_one_to_mend() {
    let heroes = party(
        "Heroes",
        [
            cleric("Priest", 20),
            fighter("Fallen", 10, 10, 80).with_current_health(0),
        ],
    );
    let foes = party("Foes", [fighter("Grik", 6, 5, 50)]);

    let mut engine = fixed_engine(7).with_sink(EventLog::new());
    let mut session = engine.create_session(heroes, foes).unwrap();
    let events_before = engine.sink().len();
    let before = session.state_hash();

    let mut cast_mend = |_: CombatantId, _: &CombatSession| Some(mend());
    let err = engine
        .execute_turn(&mut session, &mut cast_mend)
        .unwrap_err();

    assert!(matches!(err, CombatError::NoValidTargets { ref action, .. } if action == "Mend"));
    assert!(err.is_recoverable());
    assert_eq!(session.state_hash(), before);
    assert_eq!(engine.sink().len(), events_before);

    // The caller may retry with another choice.
    let retry = engine
        .execute_turn(&mut session, &mut BasicAttackSelector)
        .unwrap();
    assert_eq!(retry.actor, combatant(Side::Player, 0));
}

#[test]
fn healer_mends_wounded_ally() {
    let heroes = party(
        "Heroes",
        [
            cleric("Priest", 20),
            fighter("Knight", 10, 10, 100).with_current_health(40),
        ],
    );
    let foes = party("Foes", [fighter("Grik", 6, 5, 50)]);

    let mut engine = fixed_engine(6);
    let mut session = engine.create_session(heroes, foes).unwrap();
    let result = engine
        .execute_turn(&mut session, &mut FirstReadySelector)
        .unwrap();

    assert_eq!(result.targets[0].kind, HitKind::Heal);
    // Cleric strength 6 plus roll 6.
    assert_eq!(result.targets[0].amount, 12);
    assert_eq!(result.targets[0].remaining_health, 52);
    assert_eq!(result.total_healing(), 12);
    assert_eq!(result.total_damage(), 0);
}

// =============================================================================
// Status effects
// =============================================================================

#[test]
fn three_round_poison_ticks_three_times_and_expires_once() {
    let hero = fighter("Aria", 10, 12, 100).with_action(venom_strike(3));
    let (player, enemy) = duel(hero, fighter("Golem", 1, 1, 1000));
    let golem = combatant(Side::Enemy, 0);

    let mut engine = fixed_engine(5).with_sink(EventLog::new());
    let mut session = engine.create_session(player, enemy).unwrap();
    let poison_once =
        |_: CombatantId, session: &CombatSession| (session.round() == 1).then(|| venom_strike(3));
    let mut selector = SideSelectors::new(poison_once, BasicAttackSelector);

    for _ in 0..5 {
        engine.execute_round(&mut session, &mut selector).unwrap();
    }

    let events = engine.sink().events();
    let ticks: Vec<(u32, i32)> = events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::EffectTicked {
                round,
                character,
                delta,
                ..
            } if *character == golem => Some((*round, *delta)),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![(1, -3), (2, -3), (3, -3)]);

    let expiries: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::EffectExpired { round, effect, .. } if effect == "Poison" => Some(*round),
            _ => None,
        })
        .collect();
    assert_eq!(expiries, vec![3]);
    assert!(session.character(golem).unwrap().effects().is_empty());
}

#[test]
fn poison_kill_skips_the_victims_action() {
    let hero = fighter("Aria", 10, 12, 100).with_action(venom_strike(3));
    // Aria's opening strike leaves Grik on 2 health; Poison deals 3.
    let (player, enemy) = duel(hero, fighter("Grik", 4, 5, 17));

    let mut engine = fixed_engine(5);
    let mut session = engine.create_session(player, enemy).unwrap();
    let opening = engine
        .execute_turn(&mut session, &mut FirstReadySelector)
        .unwrap();
    assert_eq!(opening.targets[0].remaining_health, 2);
    assert_eq!(opening.targets[0].effect_applied.as_deref(), Some("Poison"));

    let grik_turn = engine
        .execute_turn(&mut session, &mut BasicAttackSelector)
        .unwrap();
    assert_eq!(grik_turn.actor, combatant(Side::Enemy, 0));
    assert!(grik_turn.action_name.is_none());
    assert!(grik_turn.targets.is_empty());
    assert_eq!(grik_turn.status_ticks[0].health_change, -2);
    assert_eq!(grik_turn.outcome, Some(CombatOutcome::Victory(Side::Player)));
    assert_eq!(grik_turn.summary.last().map(String::as_str), Some("Defeat..."));
}

// =============================================================================
// Event stream
// =============================================================================

#[test]
fn event_stream_follows_turn_order() {
    let (player, enemy) = duel(fighter("Aria", 10, 12, 100), fighter("Grik", 4, 5, 15));

    let mut engine = fixed_engine(7).with_sink(EventLog::new());
    let mut session = engine.create_session(player, enemy).unwrap();
    engine
        .run_to_completion(&mut session, &mut BasicAttackSelector, 10)
        .unwrap();

    assert_eq!(
        engine.sink().labels(),
        vec![
            "combat_started",
            "turn_started",
            "damage_or_heal_dealt",
            "character_defeated",
            "action_used",
            "turn_ended",
            "combat_ended",
        ]
    );
}

#[test]
fn stalled_battle_reports_round_limit() {
    let healer = |name: &str| {
        Character::new(name, Role::Cleric, StatBlock::new(1, 5, 10_000))
            .with_action(ActionDefinition::new("Renew", TargetRule::SelfOnly, from_percent(-500)))
    };
    let (player, enemy) = duel(healer("Lumen"), healer("Umbra"));

    let mut engine = fixed_engine(5);
    let mut session = engine.create_session(player, enemy).unwrap();
    let err = engine
        .run_to_completion(&mut session, &mut FirstReadySelector, 3)
        .unwrap_err();

    assert_eq!(err, CombatError::RoundLimitReached(3));
    assert_eq!(session.round(), 4);
    assert!(!session.is_complete());
}
