//! Build economy: unit costs and the AI controller that pays for them.
//!
//! All amounts are plain integers for deterministic simulation.

use serde::{Deserialize, Serialize};

use crate::components::{Color, ControllerId, UnitId};
use crate::error::{GameError, Result};
use crate::unit_kind::UnitType;

/// Static resource cost per unit type.
///
/// The table is compiled in and never changes at runtime.
///
/// # Example
///
/// ```
/// use nest_core::economy::UnitCostManager;
/// use nest_core::unit_kind::UnitType;
///
/// assert_eq!(UnitCostManager::get_cost(UnitType::Warrior), Ok(50));
/// assert!(UnitCostManager::get_cost(UnitType::None).is_err());
/// ```
pub struct UnitCostManager;

impl UnitCostManager {
    /// Cost of a harvester.
    pub const HARVESTER_COST: i32 = 25;
    /// Cost of a warrior.
    pub const WARRIOR_COST: i32 = 50;
    /// Cost of a blaster.
    pub const BLASTER_COST: i32 = 75;

    /// Look up the cost of a unit type.
    ///
    /// `UnitType::None` has no cost and yields [`GameError::InvalidUnitType`].
    pub fn get_cost(unit_type: UnitType) -> Result<i32> {
        match unit_type {
            UnitType::None => Err(GameError::InvalidUnitType(unit_type)),
            UnitType::Harvester => Ok(Self::HARVESTER_COST),
            UnitType::Warrior => Ok(Self::WARRIOR_COST),
            UnitType::Blaster => Ok(Self::BLASTER_COST),
        }
    }
}

/// An AI player: resource stockpile, live unit roster, and faction color.
///
/// Controllers are owned by the world; nests only hold a [`ControllerId`].
/// The roster is shared by every nest belonging to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    id: ControllerId,
    /// Current resource stockpile. Only a successful build debits it.
    pub resources: i32,
    units: Vec<UnitId>,
    color: Color,
}

impl Controller {
    /// Create a controller with a starting stockpile and no units.
    #[must_use]
    pub fn new(id: ControllerId, resources: i32, color: Color) -> Self {
        Self {
            id,
            resources,
            units: Vec::new(),
            color,
        }
    }

    /// This controller's handle.
    #[must_use]
    pub const fn id(&self) -> ControllerId {
        self.id
    }

    /// Faction tint for spawned units.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Live units, in the order they were added.
    #[must_use]
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Check if the controller can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: i32) -> bool {
        cost <= self.resources
    }

    /// Debit resources. Callers check affordability first.
    pub fn spend(&mut self, cost: i32) {
        self.resources = self.resources.saturating_sub(cost);
    }

    /// Credit resources, e.g. from harvesting.
    ///
    /// Saturates at `i32::MAX`.
    pub fn deposit(&mut self, amount: i32) {
        self.resources = self.resources.saturating_add(amount);
    }

    /// Append a unit to the roster.
    pub fn add_unit(&mut self, unit: UnitId) {
        self.units.push(unit);
    }

    /// Remove a unit from the roster by value.
    ///
    /// Returns `false` if the unit was not on the roster.
    pub fn remove_unit(&mut self, unit: UnitId) -> bool {
        if let Some(pos) = self.units.iter().position(|&u| u == unit) {
            self.units.remove(pos);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs() {
        assert_eq!(UnitCostManager::get_cost(UnitType::Harvester), Ok(25));
        assert_eq!(UnitCostManager::get_cost(UnitType::Warrior), Ok(50));
        assert_eq!(UnitCostManager::get_cost(UnitType::Blaster), Ok(75));
        assert_eq!(
            UnitCostManager::get_cost(UnitType::None),
            Err(GameError::InvalidUnitType(UnitType::None))
        );
    }

    #[test]
    fn test_can_afford_is_inclusive() {
        let controller = Controller::new(ControllerId(0), 50, Color::RED);
        assert!(controller.can_afford(50));
        assert!(!controller.can_afford(51));
    }

    #[test]
    fn test_roster_remove_absent_is_noop() {
        let mut controller = Controller::new(ControllerId(0), 0, Color::RED);
        controller.add_unit(UnitId(1));
        controller.add_unit(UnitId(2));

        assert!(controller.remove_unit(UnitId(1)));
        assert!(!controller.remove_unit(UnitId(1)));
        assert_eq!(controller.units(), &[UnitId(2)]);
    }

    #[test]
    fn test_spend_and_deposit() {
        let mut controller = Controller::new(ControllerId(0), 100, Color::BLUE);
        controller.spend(30);
        controller.deposit(5);
        assert_eq!(controller.resources, 75);
    }

    #[test]
    fn test_deposit_saturates() {
        let mut controller = Controller::new(ControllerId(0), i32::MAX - 10, Color::BLUE);
        controller.deposit(i32::MAX / 2);
        assert_eq!(controller.resources, i32::MAX);
    }
}
