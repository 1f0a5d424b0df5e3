//! # Nest Test Utilities
//!
//! Shared testing utilities:
//! - Determinism test harness
//! - World fixtures and roster helpers
//! - `proptest`, re-exported so test crates share one version

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
