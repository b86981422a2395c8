//! Headless party battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Run one battle of the built-in skirmish
//! cargo run -p party_headless -- run --seed 7
//!
//! # Run a scenario file and print the JSON report
//! cargo run -p party_headless -- run --scenario my_battle.ron --json
//!
//! # Run batch balance test
//! cargo run -p party_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p party_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Reports go to stdout, logs to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    replay_file::{load_replay, record_scenario, save_replay},
    runner::{run_battle, BattleReport},
    scenario::{Scenario, SKIRMISH_NAME},
};

#[derive(Parser)]
#[command(name = "party_headless")]
#[command(about = "Headless party battle runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle
    Run {
        /// Scenario file or built-in name
        #[arg(short, long, default_value = SKIRMISH_NAME)]
        scenario: String,

        /// Random seed (defaults to the scenario's)
        #[arg(long)]
        seed: Option<u64>,

        /// Round limit (defaults to the scenario's)
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run batch of battles for balance testing
    Batch {
        /// Scenario file or built-in name
        #[arg(short, long, default_value = SKIRMISH_NAME)]
        scenario: String,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Round limit (defaults to the scenario's)
        #[arg(long)]
        max_rounds: Option<u32>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file or built-in name
        #[arg(short, long, default_value = SKIRMISH_NAME)]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Record a battle to a replay file
    Record {
        /// Scenario file or built-in name
        #[arg(short, long, default_value = SKIRMISH_NAME)]
        scenario: String,

        /// Random seed (defaults to the scenario's)
        #[arg(long)]
        seed: Option<u64>,

        /// Replay file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Round limit (defaults to the scenario's)
        #[arg(long)]
        max_rounds: Option<u32>,
    },

    /// Play back a recorded battle
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify replay produces identical hash
        #[arg(long)]
        verify: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            max_rounds,
            json,
        }) => cmd_run(&scenario, seed, max_rounds, json),
        Some(Commands::Batch {
            scenario,
            count,
            seed,
            parallel,
            output,
            max_rounds,
        }) => cmd_batch(&scenario, count, seed, parallel, output, max_rounds),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(&scenario, seed, runs),
        Some(Commands::Record {
            scenario,
            seed,
            output,
            max_rounds,
        }) => cmd_record(&scenario, seed, output, max_rounds),
        Some(Commands::Replay { file, verify }) => cmd_replay(file, verify),
        None => cmd_run(SKIRMISH_NAME, None, None, false),
    }
}

/// Load a scenario or exit.
fn load_scenario(name_or_path: &str) -> Scenario {
    match Scenario::resolve(name_or_path) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(error = %e, scenario = name_or_path, "Failed to load scenario");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single battle
fn cmd_run(scenario: &str, seed: Option<u64>, max_rounds: Option<u32>, json: bool) {
    let scenario = load_scenario(scenario);
    let seed = scenario.seed_or_default(seed);
    let max_rounds = max_rounds.unwrap_or(scenario.max_rounds);

    tracing::info!(scenario = %scenario.name, seed, max_rounds, "Starting battle");

    let report = match run_battle(&scenario, seed, max_rounds) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("FATAL: Battle failed: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match report.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("FATAL: Failed to encode report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}

fn print_report(report: &BattleReport) {
    let mut round = 0;
    for turn in &report.turns {
        if turn.round != round {
            round = turn.round;
            println!("--- Round {round} ---");
        }
        for line in &turn.summary {
            println!("{line}");
        }
    }

    println!();
    for status in &report.roster {
        println!(
            "{:<8} {:<12} {:>4}/{:<4}",
            status.id.side.to_string(),
            status.name,
            status.health,
            status.max_health
        );
    }

    let metrics = &report.metrics;
    println!();
    match (&metrics.winner, report.completed) {
        (Some(winner), _) => println!("Winner: {winner} after {} rounds", metrics.rounds),
        (None, true) => println!("Mutual defeat after {} rounds", metrics.rounds),
        (None, false) => println!("Stalled at round {}", metrics.rounds),
    }
    println!("State hash: {:#018x}", metrics.final_state_hash);
}

/// Run batch of battles for balance testing
fn cmd_batch(
    scenario_name: &str,
    count: u32,
    seed: u64,
    parallel: u32,
    output: PathBuf,
    max_rounds: Option<u32>,
) {
    let scenario = load_scenario(scenario_name);
    let config = BatchConfig::new(scenario_name, count)
        .with_seed(seed)
        .with_parallel(parallel)
        .with_output(output)
        .with_max_rounds(max_rounds.unwrap_or(scenario.max_rounds));

    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %config.output_dir.display(),
        "Batch configuration"
    );

    let results = run_batch(&scenario, config);

    let results_path = match results.save() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "Failed to save results");
            eprintln!("FATAL: Failed to save results: {e}");
            std::process::exit(1);
        }
    };

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles played: {}", results.battles.len());
    if !results.errors.is_empty() {
        eprintln!("Battles failed: {}", results.errors.len());
    }
    for (party, rate) in &summary.win_rates {
        eprintln!("  {party:<16} {:>5.1}%", rate * 100.0);
    }
    eprintln!("Draws: {}  Stalled: {}", summary.draws, summary.stalled);
    eprintln!(
        "Rounds: avg {:.1} (min {}, max {})",
        summary.avg_rounds, summary.min_rounds, summary.max_rounds
    );
    eprintln!("Duration: {:.2}s", results.duration_seconds);
    eprintln!("Results: {}", results_path.display());

    if !results.errors.is_empty() {
        std::process::exit(1);
    }
}

/// Verify determinism by running same seed multiple times
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(scenario = %scenario.name, seed, runs, "Verifying determinism");

    let report = verify_determinism(&scenario, seed, runs, scenario.max_rounds);
    for error in &report.errors {
        eprintln!("Run failed: {error}");
    }

    if report.is_deterministic() {
        eprintln!(
            "✓ Determinism verified: {} runs with seed {} produced hash {:#018x}",
            runs, seed, report.hashes[0]
        );
    } else {
        eprintln!("✗ Determinism check FAILED: hashes {:?}", report.hashes);
        std::process::exit(1);
    }
}

/// Record a battle to a replay file
fn cmd_record(scenario: &str, seed: Option<u64>, output: PathBuf, max_rounds: Option<u32>) {
    let scenario = load_scenario(scenario);
    let seed = scenario.seed_or_default(seed);
    let max_rounds = max_rounds.unwrap_or(scenario.max_rounds);

    let replay = match record_scenario(&scenario, seed, max_rounds) {
        Ok((replay, _)) => replay,
        Err(e) => {
            eprintln!("FATAL: Recording failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = save_replay(&replay, &output) {
        eprintln!("FATAL: Failed to save replay: {e}");
        std::process::exit(1);
    }

    eprintln!(
        "Recorded {} turns ({} decisions) to {} (hash {:#018x})",
        replay.turns,
        replay.decision_count(),
        output.display(),
        replay.final_hash
    );
}

/// Play back a recorded battle
fn cmd_replay(file: PathBuf, verify: bool) {
    let replay = match load_replay(&file) {
        Ok(replay) => replay,
        Err(e) => {
            eprintln!("FATAL: Failed to load replay '{}': {e}", file.display());
            std::process::exit(1);
        }
    };

    tracing::info!(
        scenario = %replay.scenario_name,
        seed = replay.seed,
        turns = replay.turns,
        "Playing replay"
    );

    let result = if verify {
        replay.verify()
    } else {
        replay.play()
    };

    match result {
        Ok(session) => {
            let winner = session
                .winner()
                .map(|side| session.party(side).name.clone());
            eprintln!(
                "Replay finished at round {}: winner {}, hash {:#018x}",
                session.round(),
                winner.as_deref().unwrap_or("none"),
                session.state_hash()
            );
            if verify {
                eprintln!("✓ Replay verified");
            }
        }
        Err(e) => {
            eprintln!("✗ Replay failed: {e}");
            std::process::exit(1);
        }
    }
}
