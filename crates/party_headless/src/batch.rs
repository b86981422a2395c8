//! Batch battle runner for balance testing.
//!
//! Runs many seeded battles of one scenario in parallel with rayon and
//! aggregates their metrics.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::{BattleMetrics, BatchSummary};
use crate::runner::{run_battle, RunError};
use crate::scenario::{Scenario, SKIRMISH_NAME};

/// File name written into the output directory.
pub const RESULTS_FILE: &str = "batch.json";

/// Parameters of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name or path as given on the command line.
    pub scenario: String,
    /// How many battles to play.
    pub battle_count: u32,
    /// Worker threads (0 = rayon default).
    pub parallel: u32,
    /// Directory that receives [`RESULTS_FILE`].
    pub output_dir: PathBuf,
    /// Seed of the first battle; battle `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Rounds before a battle counts as stalled.
    pub max_rounds: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: SKIRMISH_NAME.into(),
            battle_count: 100,
            parallel: 0,
            output_dir: "results".into(),
            seed_start: 0,
            max_rounds: 100,
        }
    }
}

impl BatchConfig {
    /// `battle_count` battles of `scenario` with default settings.
    #[must_use]
    pub fn new(scenario: impl Into<String>, battle_count: u32) -> Self {
        Self {
            scenario: scenario.into(),
            battle_count,
            ..Self::default()
        }
    }

    /// Builder method for the output directory.
    #[must_use]
    pub fn with_output(self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..self
        }
    }

    /// Builder method for the first seed.
    #[must_use]
    pub fn with_seed(self, seed_start: u64) -> Self {
        Self { seed_start, ..self }
    }

    /// Builder method for the worker thread count.
    #[must_use]
    pub fn with_parallel(self, parallel: u32) -> Self {
        Self { parallel, ..self }
    }

    /// Builder method for the round limit.
    #[must_use]
    pub fn with_max_rounds(self, max_rounds: u32) -> Self {
        Self { max_rounds, ..self }
    }

    /// Seed of battle `index`.
    #[must_use]
    pub const fn seed_for(&self, index: u32) -> u64 {
        self.seed_start.wrapping_add(index as u64)
    }

    /// Where [`BatchResults::save`] writes.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }
}

/// Everything a batch produced; written to [`RESULTS_FILE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Parameters the batch ran with.
    pub config: BatchConfig,
    /// Metrics of every successful battle, in seed order.
    pub battles: Vec<BattleMetrics>,
    /// Win rates and round statistics over `battles`.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
    /// Battles that failed to run.
    pub errors: Vec<FailedBattle>,
}

impl BatchResults {
    /// Write pretty JSON to [`BatchConfig::results_path`], returning the path.
    pub fn save(&self) -> Result<PathBuf, RunError> {
        let path = self.config.results_path();
        std::fs::create_dir_all(&self.config.output_dir)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }

    /// Read a results file written by [`BatchResults::save`].
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A battle that returned an error instead of metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBattle {
    /// Position in the batch.
    pub index: u32,
    /// Seed the battle ran with.
    pub seed: u64,
    /// Rendered error.
    pub message: String,
}

/// Count of finished battles, shared across workers.
#[derive(Debug)]
pub struct BatchProgress {
    total: u32,
    finished: AtomicU32,
}

impl BatchProgress {
    /// Tracker for `total` battles.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            finished: AtomicU32::new(0),
        }
    }

    /// Mark one battle finished and return how many are done.
    pub fn tick(&self) -> u32 {
        self.finished.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Battles finished so far.
    #[must_use]
    pub fn finished(&self) -> u32 {
        self.finished.load(Ordering::Relaxed)
    }

    /// Share of the batch finished, 0-100.
    #[must_use]
    pub fn percent(&self) -> f64 {
        f64::from(self.finished()) * 100.0 / f64::from(self.total.max(1))
    }
}

fn play_all(scenario: &Scenario, config: &BatchConfig) -> Vec<Result<BattleMetrics, FailedBattle>> {
    let progress = BatchProgress::new(config.battle_count);
    (0..config.battle_count)
        .into_par_iter()
        .map(|index| {
            let seed = config.seed_for(index);
            let result = run_battle(scenario, seed, config.max_rounds)
                .map(|report| report.metrics)
                .map_err(|e| {
                    tracing::warn!(index, seed, error = %e, "Battle failed");
                    FailedBattle {
                        index,
                        seed,
                        message: e.to_string(),
                    }
                });
            let done = progress.tick();
            if done % 50 == 0 {
                tracing::debug!(
                    done,
                    total = config.battle_count,
                    percent = progress.percent(),
                    "Batch progress"
                );
            }
            result
        })
        .collect()
}

/// Play `config.battle_count` seeded battles of `scenario` in parallel.
///
/// With `parallel > 0` the battles run on a dedicated pool of that size;
/// otherwise on rayon's global pool. Results keep seed order regardless.
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let started = Instant::now();
    tracing::info!(
        scenario = %scenario.name,
        battles = config.battle_count,
        seed_start = config.seed_start,
        "Batch started"
    );

    let outcomes = match config.parallel {
        0 => play_all(scenario, &config),
        threads => match rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .build()
        {
            Ok(pool) => pool.install(|| play_all(scenario, &config)),
            Err(e) => {
                tracing::warn!(error = %e, "Thread pool unavailable, using the global pool");
                play_all(scenario, &config)
            }
        },
    };

    let mut battles = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(metrics) => battles.push(metrics),
            Err(failed) => errors.push(failed),
        }
    }

    let summary = BatchSummary::from_battles(&battles);
    let duration_seconds = started.elapsed().as_secs_f64();
    tracing::info!(
        played = battles.len(),
        failed = errors.len(),
        seconds = duration_seconds,
        "Batch finished"
    );

    BatchResults {
        config,
        battles,
        summary,
        duration_seconds,
        errors,
    }
}

/// Final hashes from replaying one seed several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed under test.
    pub seed: u64,
    /// Final state hash of each successful run.
    pub hashes: Vec<u64>,
    /// Messages from runs that failed.
    pub errors: Vec<String>,
}

impl DeterminismReport {
    /// Every run succeeded and all hashes agree (at least one run).
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.errors.is_empty()
            && self
                .hashes
                .first()
                .is_some_and(|first| self.hashes.iter().all(|h| h == first))
    }
}

/// Run `scenario` with `seed` `runs` times and collect the final hashes.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
    max_rounds: u32,
) -> DeterminismReport {
    let (hashes, errors) = (0..runs)
        .map(|_| run_battle(scenario, seed, max_rounds))
        .fold((Vec::new(), Vec::new()), |(mut hashes, mut errors), run| {
            match run {
                Ok(report) => hashes.push(report.metrics.final_state_hash),
                Err(e) => errors.push(e.to_string()),
            }
            (hashes, errors)
        });
    DeterminismReport {
        seed,
        hashes,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skirmish() -> Scenario {
        Scenario::skirmish().unwrap()
    }

    #[test]
    fn test_config_builders() {
        let config = BatchConfig::new("duel.ron", 250)
            .with_output("/tmp/balance")
            .with_seed(u64::MAX)
            .with_parallel(4)
            .with_max_rounds(30);

        assert_eq!(config.battle_count, 250);
        assert_eq!(config.max_rounds, 30);
        assert_eq!(config.seed_for(0), u64::MAX);
        assert_eq!(config.seed_for(1), 0);
        assert_eq!(config.results_path(), PathBuf::from("/tmp/balance/batch.json"));
    }

    #[test]
    fn test_progress_counts_up() {
        let progress = BatchProgress::new(4);
        assert_eq!(progress.finished(), 0);
        assert_eq!(progress.tick(), 1);
        assert_eq!(progress.tick(), 2);
        assert!((progress.percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_keeps_seed_order() {
        let results = run_batch(&skirmish(), BatchConfig::new("skirmish", 8).with_parallel(2));

        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_battles, 8);
        let seeds: Vec<u64> = results.battles.iter().map(|b| b.seed).collect();
        assert_eq!(seeds, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let scenario = skirmish();
        let results = run_batch(&scenario, BatchConfig::new("skirmish", 4).with_seed(100));
        for battle in &results.battles {
            let single = run_battle(&scenario, battle.seed, 100).unwrap();
            assert_eq!(single.metrics, *battle);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let report = verify_determinism(&skirmish(), 12345, 3, 100);
        assert_eq!(report.hashes.len(), 3);
        assert!(report.is_deterministic());
    }

    #[test]
    fn test_zero_runs_proves_nothing() {
        let report = verify_determinism(&skirmish(), 1, 0, 100);
        assert!(!report.is_deterministic());
    }

    #[test]
    fn test_results_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::new("skirmish", 3).with_output(dir.path().join("out"));
        let results = run_batch(&skirmish(), config);

        let path = results.save().unwrap();
        assert_eq!(path, dir.path().join("out").join(RESULTS_FILE));

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.battles, results.battles);
        assert_eq!(loaded.config, results.config);
    }
}
