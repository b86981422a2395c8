//! Determinism testing utilities.
//!
//! Provides a harness for verifying that combat produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A combat must be exactly reproducible from its seed and selector
//! decisions. Sources of non-determinism include:
//!
//! - **Floating-point math**: multipliers use fixed-point via
//!   [`party_core::math::Fixed`].
//!
//! - **HashMap iteration order**: equipment and cooldowns live in `BTreeMap`s.
//!
//! - **System randomness**: every roll goes through an injected
//!   [`party_core::rng::RandomSource`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual module determinism (turn order, ticks)
//! 2. **Property tests**: random rosters must still produce deterministic outcomes
//! 3. **Integration tests**: full battles are reproducible
//! 4. **Parallel tests**: running N battles on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use party_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps executed per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic combat).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Combat is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// A seeded engine paired with the session it drives.
pub type SeededBattle = (CombatEngine<SeededRandom>, CombatSession);

/// Start a seeded battle from two parties.
///
/// # Panics
///
/// Panics if the parties reference gear missing from `catalog`.
#[must_use]
pub fn seeded_battle(
    seed: u64,
    catalog: GearCatalog,
    player: Party,
    enemy: Party,
) -> SeededBattle {
    let mut engine = CombatEngine::new(CombatConfig::default(), catalog, SeededRandom::new(seed))
        .expect("default config is valid");
    let session = engine
        .create_session(player, enemy)
        .expect("battle gear resolves");
    (engine, session)
}

/// Advance a battle by one turn with the first-ready selector.
///
/// Completed battles are left untouched.
pub fn step_battle((engine, session): &mut SeededBattle) {
    if !session.is_complete() {
        // Stock selectors only pick actions with targets.
        let _ = engine.execute_turn(session, &mut FirstReadySelector);
    }
}

/// Run the same seeded battle twice and compare final hashes.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates the engine and session
/// * `turns` - Number of turns to run
pub fn verify_battle_determinism<F>(setup_fn: F, turns: u64) -> bool
where
    F: Fn() -> SeededBattle,
{
    verify_determinism(2, turns, &setup_fn, step_battle, |(_, session)| {
        session.state_hash()
    })
    .is_deterministic
}

/// Run N battles on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, turns: u64) -> Vec<u64>
where
    F: Fn() -> SeededBattle + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..turns {
                        step_battle(&mut battle);
                    }
                    battle.1.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    })
}

/// Compare two battle runs turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(turn)` if they diverge at that turn.
pub fn find_first_divergence<F>(setup_fn: F, turns: u64) -> Option<u64>
where
    F: Fn() -> SeededBattle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.1.state_hash() != second.1.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        step_battle(&mut first);
        step_battle(&mut second);

        if first.1.state_hash() != second.1.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves session state exactly.
pub fn verify_serialization_determinism<F>(setup_fn: F, turns: u64) -> bool
where
    F: Fn() -> SeededBattle,
{
    let mut battle = setup_fn();
    for _ in 0..turns {
        step_battle(&mut battle);
    }

    let hash_before = battle.1.state_hash();
    let Ok(bytes) = battle.1.serialize() else {
        return false;
    };
    let Ok(restored) = CombatSession::deserialize(&bytes) else {
        return false;
    };

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat testing.
///
/// These strategies generate random but reproducible rosters and actions.
pub mod strategies {
    use party_core::prelude::*;
    use proptest::prelude::*;

    /// Generate a stat block with realistic ranges.
    pub fn arb_stat_block() -> impl Strategy<Value = StatBlock> {
        (1u32..30, 1u32..20, 1u32..200)
            .prop_map(|(strength, dexterity, health)| StatBlock::new(strength, dexterity, health))
    }

    /// Generate any targeting rule.
    pub fn arb_target_rule() -> impl Strategy<Value = TargetRule> {
        prop_oneof![
            Just(TargetRule::SingleEnemy),
            Just(TargetRule::AllEnemies),
            Just(TargetRule::SingleAlly),
            Just(TargetRule::AllAllies),
            Just(TargetRule::SelfOnly),
        ]
    }

    /// Generate a status effect (periodic or stat modifier).
    pub fn arb_status_effect() -> impl Strategy<Value = StatusEffect> {
        prop_oneof![
            (1u32..5, 1i32..10).prop_map(|(d, m)| StatusEffect::damage_over_time("Poison", d, m)),
            (1u32..5, 1i32..10).prop_map(|(d, m)| StatusEffect::heal_over_time("Regen", d, m)),
            (1u32..5, -5i32..5)
                .prop_map(|(d, m)| StatusEffect::stat_modifier("Hex", d, StatKind::Defense, m)),
        ]
    }

    /// Generate an action. Enemy-targeting actions damage; ally and self
    /// actions heal.
    pub fn arb_action() -> impl Strategy<Value = ActionDefinition> {
        (
            arb_target_rule(),
            10i32..200,
            0u32..4,
            proptest::option::of(arb_status_effect()),
            0u32..1000,
        )
            .prop_map(|(target, percent, cooldown, effect, id)| {
                let signed = if target.targets_enemies() {
                    percent
                } else {
                    -percent
                };
                let action =
                    ActionDefinition::new(format!("Skill {id}"), target, from_percent(signed))
                        .with_cooldown(cooldown);
                match effect {
                    Some(effect) => action.with_effect(effect),
                    None => action,
                }
            })
    }

    /// Generate a character with up to three actions.
    pub fn arb_character() -> impl Strategy<Value = Character> {
        (
            "[A-Z][a-z]{2,8}",
            arb_stat_block(),
            proptest::collection::vec(arb_action(), 0..3),
        )
            .prop_map(|(name, stats, actions)| {
                actions
                    .into_iter()
                    .fold(Character::new(name, Role::Warrior, stats), Character::with_action)
            })
    }

    /// Generate a party of 1 to `max_members` characters.
    pub fn arb_party(max_members: usize) -> impl Strategy<Value = Party> {
        let max = max_members.clamp(1, MAX_PARTY_SIZE);
        proptest::collection::vec(arb_character(), 1..=max).prop_map(|members| {
            Party::with_members("Generated", members).expect("size bounded by strategy")
        })
    }

    /// Generate a seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
