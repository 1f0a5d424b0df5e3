//! Error types for the nest simulation.

use thiserror::Error;

use crate::unit_kind::UnitType;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all nest simulation errors.
///
/// Refusals that the AI is expected to retry on a later tick (not enough
/// resources, cooldown still running) are not errors; see
/// [`BuildOutcome`](crate::nest::BuildOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A unit type that cannot be built, costed, or returned.
    #[error("Invalid unit type: {0:?}")]
    InvalidUnitType(UnitType),

    /// Invalid nest handle.
    #[error("Nest not found: {0}")]
    UnknownNest(u32),

    /// Invalid controller handle.
    #[error("Controller not found: {0}")]
    UnknownController(u32),

    /// Invalid unit handle.
    #[error("Unit not found: {0}")]
    UnknownUnit(u32),

    /// The nest has no pool for the requested unit type.
    #[error("No pool for unit type {0:?}; was the nest initialized?")]
    PoolMissing(UnitType),

    /// Data parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the file or string that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
