//! Test fixtures and helpers.
//!
//! Pre-built worlds and queries for consistent testing.

use fixed::types::I32F32;
use nest_core::components::{Color, ControllerId, NestId, UnitId};
use nest_core::data::{NestConfig, NestData};
use nest_core::math::Vec2Fixed;
use nest_core::simulation::World;
use nest_core::unit_kind::UnitType;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A world with one controller and one active nest at the origin.
#[derive(Debug, Clone)]
pub struct OneNest {
    /// The world.
    pub world: World,
    /// The only controller.
    pub controller: ControllerId,
    /// The only nest.
    pub nest: NestId,
}

impl OneNest {
    /// Build with default nest data, the given stockpile and RNG seed.
    ///
    /// # Panics
    ///
    /// Panics if the default data fails validation.
    #[must_use]
    pub fn new(seed: u64, resources: i32) -> Self {
        Self::with_config(seed, resources, NestConfig::default())
    }

    /// Build with custom nest tunables.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    #[must_use]
    pub fn with_config(seed: u64, resources: i32, config: NestConfig) -> Self {
        let mut world = World::new(seed);
        let controller = world.add_controller(resources, Color::RED);
        let data = NestData {
            config,
            ..NestData::default()
        };
        let nest = world
            .add_nest(controller, Vec2Fixed::ZERO, &data)
            .expect("fixture nest data is valid");
        world.activate_nest(nest).expect("fixture nest activates");
        Self {
            world,
            controller,
            nest,
        }
    }

    /// Advance until the starting units have been seeded.
    pub fn settle(&mut self) {
        let delay = self
            .world
            .nest(self.nest)
            .map_or(0, |n| n.config().settle_delay_ticks);
        for _ in 0..delay {
            self.world.tick();
        }
    }

    /// Advance `ticks` ticks.
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.world.tick();
        }
    }

    /// The controller's current resources.
    #[must_use]
    pub fn resources(&self) -> i32 {
        self.world
            .controller(self.controller)
            .map_or(0, |c| c.resources)
    }

    /// The controller's roster.
    #[must_use]
    pub fn roster(&self) -> Vec<UnitId> {
        self.world
            .controller(self.controller)
            .map(|c| c.units().to_vec())
            .unwrap_or_default()
    }

    /// Roster entries of one unit type.
    #[must_use]
    pub fn roster_of(&self, unit_type: UnitType) -> Vec<UnitId> {
        units_of_type(&self.world, &self.roster(), unit_type)
    }
}

/// Filter unit ids down to one type.
#[must_use]
pub fn units_of_type(world: &World, units: &[UnitId], unit_type: UnitType) -> Vec<UnitId> {
    units
        .iter()
        .copied()
        .filter(|&id| world.unit(id).is_some_and(|u| u.unit_type() == unit_type))
        .collect()
}

/// Active units whose nest back-reference points at `nest`.
#[must_use]
pub fn units_of_nest(world: &World, nest: NestId) -> Vec<UnitId> {
    world
        .units()
        .active()
        .filter(|u| u.nest == Some(nest))
        .map(|u| u.id())
        .collect()
}
