//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::unit_kind::UnitType;
use crate::units::UnitPrototype;

/// Data-driven unit definition.
///
/// Each entry becomes the prototype of one nest pool.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     unit_type: Warrior,
///     max_health: 100,
///     attack_radius: 8589934592,  // Fixed-point for 2.0
///     attack_damage: 15,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitData {
    /// Which unit type this entry defines.
    pub unit_type: UnitType,

    /// Health on activation.
    pub max_health: i32,

    /// Radius of the attack overlap query (fixed-point raw bits).
    #[serde(default, with = "fixed_serde")]
    pub attack_radius: Fixed,

    /// Damage per attack. Zero for non-combatants.
    #[serde(default)]
    pub attack_damage: i32,
}

impl UnitData {
    /// Built-in stats for a unit type.
    #[must_use]
    pub fn default_for(unit_type: UnitType) -> Self {
        let (max_health, attack_radius, attack_damage) = match unit_type {
            UnitType::None => (0, 0, 0),
            UnitType::Harvester => (60, 0, 0),
            UnitType::Warrior => (100, 2, 15),
            UnitType::Blaster => (80, 4, 40),
        };
        Self {
            unit_type,
            max_health,
            attack_radius: Fixed::from_num(attack_radius),
            attack_damage,
        }
    }

    /// Check if this unit can engage in combat.
    #[must_use]
    pub fn is_combatant(&self) -> bool {
        self.unit_type.attack_style().can_attack() && self.attack_damage > 0
    }

    /// Prototype for the pool serving this unit type.
    #[must_use]
    pub fn to_prototype(&self) -> UnitPrototype {
        UnitPrototype::new(
            self.unit_type,
            self.max_health,
            self.attack_radius,
            self.attack_damage,
        )
    }
}
