//! # Nest Core
//!
//! Deterministic simulation core for nest-based unit production.
//!
//! A nest spawns units for an AI controller from per-type object pools,
//! charging the controller's resources and enforcing a build cooldown.
//! Units fight with overlap-query attacks, and when a nest falls every unit
//! it spawned is drained back into its pools.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (spawn offsets use a seeded RNG)
//! - Fixed-point positions and radii
//!
//! ## Crate Structure
//!
//! - [`simulation`] - The [`World`](simulation::World) that owns everything and advances ticks
//! - [`nest`] - Nest lifecycle, build requests, seeding and drain
//! - [`pool`] - Object pools of unit instances
//! - [`units`] - Unit instances and their arena
//! - [`combat`] - Attack target selection
//! - [`spatial`] - Overlap query contract and layer masks
//! - [`economy`] - Unit costs and AI controllers
//! - [`scheduler`] - Delayed single-shot tasks
//! - [`data`] - RON-loadable tunables
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod economy;
pub mod error;
pub mod math;
pub mod nest;
pub mod pool;
pub mod scheduler;
pub mod simulation;
pub mod spatial;
pub mod unit_kind;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::AttackTarget;
    pub use crate::components::{Color, ControllerId, NestId, UnitId};
    pub use crate::data::{NestConfig, NestData, UnitData};
    pub use crate::economy::{Controller, UnitCostManager};
    pub use crate::error::{GameError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::nest::{BuildOutcome, NestState, NestStructure};
    pub use crate::pool::UnitPool;
    pub use crate::simulation::{NestEvent, World, TICK_RATE};
    pub use crate::spatial::{Collider, FixedHits, Layers, SpatialQuery};
    pub use crate::unit_kind::{AttackStyle, UnitType};
    pub use crate::units::{Unit, UnitArena, UnitPrototype};
}
