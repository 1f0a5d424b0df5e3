//! Scenario loading and configuration.
//!
//! A scenario places one nest per AI side, gives each side a stockpile and a
//! build order, and sets the match-wide economy knobs.

use std::path::Path;

use nest_core::components::{Color, ControllerId, NestId};
use nest_core::data::NestData;
use nest_core::error::GameError;
use nest_core::math::Vec2Fixed;
use nest_core::simulation::World;
use nest_core::unit_kind::UnitType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario parsed but describes an impossible setup.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] GameError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// One entry per AI side.
    pub sides: Vec<SideSetup>,
    /// Resources each active harvester earns its side per second.
    #[serde(default = "default_harvest_rate")]
    pub harvest_rate: i32,
    /// Ground distance a combatant closes per tick while marching.
    #[serde(default = "default_march_speed")]
    pub march_speed: i32,
}

/// Largest absolute nest coordinate. Squared distances between any two
/// nests inside this box stay well within fixed-point range.
pub const MAX_COORDINATE: i32 = 10_000;

/// Largest per-harvester income per second.
pub const MAX_HARVEST_RATE: i32 = 10_000;

/// Largest per-tick march distance.
pub const MAX_MARCH_SPEED: i32 = 100;

const fn default_harvest_rate() -> i32 {
    5
}

const fn default_march_speed() -> i32 {
    1
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish_1v1()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Two nests facing each other across open ground.
    #[must_use]
    pub fn skirmish_1v1() -> Self {
        Self {
            name: "Nest Skirmish".to_string(),
            description: "Two nests 60 units apart, mirrored build orders".to_string(),
            sides: vec![
                SideSetup::new("red", Color::RED, (0, 0)),
                SideSetup::new("blue", Color::BLUE, (60, 0)),
            ],
            harvest_rate: default_harvest_rate(),
            march_speed: default_march_speed(),
        }
    }

    /// Check everything that would make [`Scenario::build_world`] fail.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.sides.is_empty() {
            return Err(GameError::InvalidConfig("scenario has no sides".to_string()));
        }
        if !(0..=MAX_HARVEST_RATE).contains(&self.harvest_rate) {
            return Err(GameError::InvalidConfig(format!(
                "harvest_rate {} outside 0..={MAX_HARVEST_RATE}",
                self.harvest_rate
            )));
        }
        if !(0..=MAX_MARCH_SPEED).contains(&self.march_speed) {
            return Err(GameError::InvalidConfig(format!(
                "march_speed {} outside 0..={MAX_MARCH_SPEED}",
                self.march_speed
            )));
        }
        for side in &self.sides {
            let (x, y) = side.position;
            let limit = MAX_COORDINATE.unsigned_abs();
            if x.unsigned_abs() > limit || y.unsigned_abs() > limit {
                return Err(GameError::InvalidConfig(format!(
                    "side {} at ({x}, {y}) is outside +/-{MAX_COORDINATE}",
                    side.name
                )));
            }
            side.nest.validate()?;
            if let Some(&bad) = side.build_order.iter().find(|t| !t.is_valid()) {
                return Err(GameError::InvalidUnitType(bad));
            }
        }
        Ok(())
    }

    /// Create a world for this scenario and activate every nest.
    ///
    /// Sides come back in scenario order.
    pub fn build_world(&self, seed: u64) -> Result<(World, Vec<Side>), ScenarioError> {
        let mut world = World::new(seed);
        let mut sides = Vec::with_capacity(self.sides.len());

        for setup in &self.sides {
            let controller = world.add_controller(setup.starting_resources, setup.color);
            let position = Vec2Fixed::from_ints(setup.position.0, setup.position.1);
            let nest = world.add_nest(controller, position, &setup.nest)?;
            world.activate_nest(nest)?;
            sides.push(Side {
                name: setup.name.clone(),
                controller,
                nest,
                build_order: setup.build_order.clone(),
            });
        }

        tracing::debug!(scenario = %self.name, sides = sides.len(), seed, "World built");
        Ok((world, sides))
    }
}

/// Setup for a single AI side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSetup {
    /// Side name, used in summaries.
    pub name: String,
    /// Tint for this side's units.
    pub color: Color,
    /// Nest position (x, y).
    pub position: (i32, i32),
    /// Starting resources.
    pub starting_resources: i32,
    /// Unit types to request, cycled forever.
    #[serde(default = "default_build_order")]
    pub build_order: Vec<UnitType>,
    /// Nest and unit tunables.
    #[serde(default)]
    pub nest: NestData,
}

fn default_build_order() -> Vec<UnitType> {
    vec![
        UnitType::Harvester,
        UnitType::Warrior,
        UnitType::Warrior,
        UnitType::Blaster,
    ]
}

impl SideSetup {
    /// A side with default tunables and build order.
    #[must_use]
    pub fn new(name: &str, color: Color, position: (i32, i32)) -> Self {
        Self {
            name: name.to_string(),
            color,
            position,
            starting_resources: 200,
            build_order: default_build_order(),
            nest: NestData::default(),
        }
    }
}

/// Handles for one side once the world exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    /// Side name.
    pub name: String,
    /// Its controller.
    pub controller: ControllerId,
    /// Its nest.
    pub nest: NestId,
    /// Unit types to request, cycled.
    pub build_order: Vec<UnitType>,
}
