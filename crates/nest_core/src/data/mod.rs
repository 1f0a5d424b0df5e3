//! Data structures for nest and unit configuration.
//!
//! All structs are designed to be deserialized from RON. Parsing from a
//! string lives here; reading files is left to the caller.

mod nest_data;
mod unit_data;

pub use nest_data::{NestConfig, NestData};
pub use unit_data::UnitData;
