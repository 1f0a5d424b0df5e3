//! Headless nest match runner for AI testing and CI verification.
//!
//! Loads a RON [`Scenario`], drives a [`nest_core::simulation::World`] for a
//! number of ticks with a simple AI policy per side, and reports the result
//! as JSON:
//!
//! - **stdout**: JSON summary ([`RunSummary`] or [`VerifyReport`])
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! cargo run -p nest_headless -- run --scenario scenarios/duel.ron --ticks 2400 --seed 3
//! cargo run -p nest_headless -- verify --runs 8
//! ```

pub mod runner;
pub mod scenario;

pub use runner::{run_match, verify_determinism, Match, RunSummary, SideSummary, VerifyReport};
pub use scenario::{Scenario, ScenarioError, SideSetup};
