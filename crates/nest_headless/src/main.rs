//! Headless nest match runner.
//!
//! Runs a scenario without graphics and prints a JSON summary on stdout.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in skirmish for 1200 ticks (one minute)
//! cargo run -p nest_headless -- run --ticks 1200
//!
//! # Run a scenario file with a given seed
//! cargo run -p nest_headless -- run --scenario scenarios/duel.ron --seed 7
//!
//! # Verify determinism
//! cargo run -p nest_headless -- verify --runs 8
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nest_headless::{
    runner::{run_match, verify_determinism},
    scenario::{Scenario, ScenarioError},
};

#[derive(Parser)]
#[command(name = "nest_headless")]
#[command(about = "Headless nest match runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and print its summary
    Run {
        /// Scenario file to load (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Maximum ticks to simulate
        #[arg(short, long, default_value = "6000")]
        ticks: u64,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Scenario file to load (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Ticks per run
        #[arg(short, long, default_value = "2400")]
        ticks: u64,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the JSON summary, so logs go to stderr
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

    let result = match cli.command {
        Commands::Run {
            scenario,
            ticks,
            seed,
        } => cmd_run(scenario, ticks, seed),
        Commands::Verify {
            scenario,
            ticks,
            seed,
            runs,
        } => cmd_verify(scenario, ticks, seed, runs),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => {
            tracing::info!("Using scenario: {}", path.display());
            Scenario::load(path)
        }
        None => Ok(Scenario::skirmish_1v1()),
    }
}

/// Run a single match
fn cmd_run(scenario: Option<PathBuf>, ticks: u64, seed: u64) -> Result<ExitCode, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(scenario = %scenario.name, ticks, seed, "Starting match");

    let summary = run_match(&scenario, seed, ticks)?;
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize summary");
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Verify determinism
fn cmd_verify(
    scenario: Option<PathBuf>,
    ticks: u64,
    seed: u64,
    runs: u32,
) -> Result<ExitCode, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs, {} ticks)",
        scenario.name,
        seed,
        runs,
        ticks
    );

    let report = verify_determinism(&scenario, seed, ticks, runs)?;
    if let Ok(json) = serde_json::to_string_pretty(&report) {
        println!("{json}");
    }

    if report.deterministic {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        Ok(ExitCode::FAILURE)
    }
}
