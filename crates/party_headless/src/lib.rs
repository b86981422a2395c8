//! Headless battle runner for balance testing and CI verification.
//!
//! This crate drives `party_core` combats from RON scenario files without
//! any interactive surface:
//!
//! - **Single battles**: print the turn-by-turn narration or a JSON report
//! - **Batch runs**: play many seeded battles in parallel and aggregate metrics
//! - **Determinism checks**: run one seed repeatedly and compare state hashes
//! - **Replays**: record a battle to disk and verify it plays back identically
//!
//! Logs go to stderr; stdout carries reports only.
//!
//! # Example
//!
//! ```bash
//! # Run the built-in skirmish
//! cargo run -p party_headless -- run --seed 7
//!
//! # Balance test
//! cargo run -p party_headless -- batch --count 1000 --output results/
//!
//! # Record and verify a replay
//! cargo run -p party_headless -- record --seed 7 --output skirmish.replay
//! cargo run -p party_headless -- replay --file skirmish.replay --verify
//! ```

pub mod batch;
pub mod metrics;
pub mod replay_file;
pub mod runner;
pub mod scenario;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, DeterminismReport};
pub use metrics::{BattleMetrics, BatchSummary, MetricsCollector};
pub use replay_file::{load_replay, record_scenario, save_replay, ReplayError};
pub use runner::{run_battle, BattleReport, RunError};
pub use scenario::{Scenario, ScenarioError};
pub use strategies::Strategy;
