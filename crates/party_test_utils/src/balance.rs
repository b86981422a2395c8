//! Balance testing utilities.
//!
//! Run many seeded battles for one matchup and summarize who wins, how
//! long fights last and how much of the winning side survives.

use party_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of a simulated battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// Winning side (None on mutual defeat or stall).
    pub winner: Option<Side>,
    /// Round counter when the battle stopped.
    pub rounds: u32,
    /// Turns executed.
    pub turns: u32,
    /// Living player members at the end.
    pub player_survivors: usize,
    /// Living enemy members at the end.
    pub enemy_survivors: usize,
}

/// Statistics for a set of battles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    /// Total battles run.
    pub total_battles: u32,
    /// Player party wins.
    pub player_wins: u32,
    /// Enemy party wins.
    pub enemy_wins: u32,
    /// Mutual defeats and stalls.
    pub draws: u32,
    /// Average rounds to resolution.
    pub avg_rounds: f64,
}

impl BattleStats {
    /// Aggregate a set of results.
    #[must_use]
    pub fn from_results(results: &[BattleResult]) -> Self {
        let mut stats = Self {
            total_battles: results.len() as u32,
            ..Self::default()
        };
        for result in results {
            match result.winner {
                Some(Side::Player) => stats.player_wins += 1,
                Some(Side::Enemy) => stats.enemy_wins += 1,
                None => stats.draws += 1,
            }
        }
        if !results.is_empty() {
            let rounds: u64 = results.iter().map(|r| u64::from(r.rounds)).sum();
            stats.avg_rounds = rounds as f64 / results.len() as f64;
        }
        stats
    }

    /// Win rate for the player party (0.0 to 1.0).
    #[must_use]
    pub fn player_win_rate(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        f64::from(self.player_wins) / f64::from(self.total_battles)
    }

    /// Win rate for the enemy party (0.0 to 1.0).
    #[must_use]
    pub fn enemy_win_rate(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        f64::from(self.enemy_wins) / f64::from(self.total_battles)
    }

    /// Check if the matchup is balanced (player win rate within range).
    #[must_use]
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.player_win_rate();
        rate >= min_rate && rate <= max_rate
    }
}

/// Run one seeded battle with the first-ready selector on both sides.
///
/// A battle still running after `max_rounds` counts as a draw.
///
/// # Panics
///
/// Panics if the parties reference gear missing from `catalog`.
#[must_use]
pub fn simulate_battle(
    seed: u64,
    catalog: &GearCatalog,
    player: &Party,
    enemy: &Party,
    max_rounds: u32,
) -> BattleResult {
    let mut engine = CombatEngine::new(
        CombatConfig::default(),
        catalog.clone(),
        SeededRandom::new(seed),
    )
    .expect("default config is valid");
    let mut session = engine
        .create_session(player.clone(), enemy.clone())
        .expect("battle gear resolves");

    let turns = match engine.run_to_completion(&mut session, &mut FirstReadySelector, max_rounds) {
        Ok(results) => results.len() as u32,
        Err(err) => {
            tracing::debug!(seed, error = %err, "Battle did not finish");
            0
        }
    };

    BattleResult {
        winner: session.winner(),
        rounds: session.round(),
        turns,
        player_survivors: session.party(Side::Player).alive_count(),
        enemy_survivors: session.party(Side::Enemy).alive_count(),
    }
}

/// Run `count` battles with seeds `base_seed..base_seed + count`.
#[must_use]
pub fn run_matchup(
    base_seed: u64,
    count: u32,
    catalog: &GearCatalog,
    player: &Party,
    enemy: &Party,
    max_rounds: u32,
) -> BattleStats {
    let results: Vec<BattleResult> = (0..u64::from(count))
        .map(|i| simulate_battle(base_seed + i, catalog, player, enemy, max_rounds))
        .collect();
    BattleStats::from_results(&results)
}
