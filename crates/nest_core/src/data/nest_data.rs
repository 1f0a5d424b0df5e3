//! Nest tunables and the unit roster a nest can produce.

use serde::{Deserialize, Serialize};

use super::unit_data::UnitData;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};
use crate::unit_kind::UnitType;

/// Build-time tunables for one nest.
///
/// Durations are in simulation ticks
/// (see [`TICK_RATE`](crate::simulation::TICK_RATE)).
///
/// # Example RON
///
/// ```ron
/// NestConfig(
///     max_health: 1000,
///     spawn_distance: 21474836480,  // Fixed-point for 5.0
///     build_cooldown_ticks: 10,
///     start_harvesters: 3,
///     start_warriors: 2,
///     start_blasters: 1,
///     initial_instance_count: 30,
///     settle_delay_ticks: 20,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NestConfig {
    /// Health on activation.
    #[serde(default = "default_max_health")]
    pub max_health: i32,

    /// Distance from the nest at which units spawn.
    #[serde(default = "default_spawn_distance", with = "fixed_serde")]
    pub spawn_distance: Fixed,

    /// Minimum ticks between two paid builds.
    #[serde(default = "default_build_cooldown_ticks")]
    pub build_cooldown_ticks: u32,

    /// Harvesters built when the nest seeds.
    #[serde(default = "default_start_harvesters")]
    pub start_harvesters: u32,

    /// Warriors built when the nest seeds.
    #[serde(default = "default_start_warriors")]
    pub start_warriors: u32,

    /// Blasters built when the nest seeds.
    #[serde(default = "default_start_blasters")]
    pub start_blasters: u32,

    /// Instances pre-created in each pool.
    #[serde(default = "default_initial_instance_count")]
    pub initial_instance_count: u32,

    /// Ticks between activation and seeding.
    #[serde(default = "default_settle_delay_ticks")]
    pub settle_delay_ticks: u32,
}

const fn default_max_health() -> i32 {
    1000
}

fn default_spawn_distance() -> Fixed {
    Fixed::from_num(5)
}

/// 0.5 s at 20 ticks per second.
const fn default_build_cooldown_ticks() -> u32 {
    10
}

const fn default_start_harvesters() -> u32 {
    3
}

const fn default_start_warriors() -> u32 {
    2
}

const fn default_start_blasters() -> u32 {
    1
}

const fn default_initial_instance_count() -> u32 {
    30
}

/// 1 s at 20 ticks per second.
const fn default_settle_delay_ticks() -> u32 {
    20
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            spawn_distance: default_spawn_distance(),
            build_cooldown_ticks: default_build_cooldown_ticks(),
            start_harvesters: default_start_harvesters(),
            start_warriors: default_start_warriors(),
            start_blasters: default_start_blasters(),
            initial_instance_count: default_initial_instance_count(),
            settle_delay_ticks: default_settle_delay_ticks(),
        }
    }
}

impl NestConfig {
    /// How many units of `unit_type` the nest seeds.
    #[must_use]
    pub const fn start_count(&self, unit_type: UnitType) -> u32 {
        match unit_type {
            UnitType::None => 0,
            UnitType::Harvester => self.start_harvesters,
            UnitType::Warrior => self.start_warriors,
            UnitType::Blaster => self.start_blasters,
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_health <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "max_health must be positive, got {}",
                self.max_health
            )));
        }
        if self.spawn_distance < Fixed::ZERO {
            return Err(GameError::InvalidConfig(format!(
                "spawn_distance must not be negative, got {}",
                self.spawn_distance
            )));
        }
        Ok(())
    }
}

/// Everything needed to stand up a nest: tunables plus one entry per unit type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NestData {
    /// Nest tunables.
    #[serde(default)]
    pub config: NestConfig,

    /// Unit definitions; one per buildable unit type.
    #[serde(default = "default_units")]
    pub units: Vec<UnitData>,
}

fn default_units() -> Vec<UnitData> {
    UnitType::BUILDABLE
        .iter()
        .map(|&t| UnitData::default_for(t))
        .collect()
}

impl Default for NestData {
    fn default() -> Self {
        Self {
            config: NestConfig::default(),
            units: default_units(),
        }
    }
}

impl NestData {
    /// Parse and validate nest data from a RON string.
    ///
    /// `source_name` only labels errors.
    pub fn from_ron_str(source_name: &str, ron: &str) -> Result<Self> {
        let data: Self = ron::from_str(ron).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        data.validate()?;
        Ok(data)
    }

    /// Get the definition for a unit type.
    #[must_use]
    pub fn unit(&self, unit_type: UnitType) -> Option<&UnitData> {
        self.units.iter().find(|u| u.unit_type == unit_type)
    }

    /// Check the config and that every buildable type is defined exactly once.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        if let Some(bad) = self.units.iter().find(|u| !u.unit_type.is_valid()) {
            return Err(GameError::InvalidUnitType(bad.unit_type));
        }
        for unit_type in UnitType::BUILDABLE {
            let count = self
                .units
                .iter()
                .filter(|u| u.unit_type == unit_type)
                .count();
            if count != 1 {
                return Err(GameError::InvalidConfig(format!(
                    "expected exactly one definition for {}, found {count}",
                    unit_type.name()
                )));
            }
        }
        if let Some(bad) = self.units.iter().find(|u| u.max_health <= 0) {
            return Err(GameError::InvalidConfig(format!(
                "{} max_health must be positive",
                bad.unit_type.name()
            )));
        }
        Ok(())
    }
}
