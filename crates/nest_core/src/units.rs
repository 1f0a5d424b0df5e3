//! Unit instances and the arena that owns them.
//!
//! Units are never freed. A unit that dies or is drained is deactivated and
//! goes back to its pool, keeping its [`UnitId`] for the next spawn.

use serde::{Deserialize, Serialize};

use crate::components::{Color, NestId, UnitId};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::unit_kind::UnitType;

/// Descriptor a pool instantiates new units from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrototype {
    /// Type of every instance made from this prototype.
    pub unit_type: UnitType,
    /// Health on activation.
    pub max_health: i32,
    /// Radius of the attack overlap query.
    #[serde(with = "fixed_serde")]
    pub attack_radius: Fixed,
    /// Damage dealt per attack.
    pub attack_damage: i32,
}

impl UnitPrototype {
    /// Create a new prototype.
    #[must_use]
    pub fn new(unit_type: UnitType, max_health: i32, attack_radius: Fixed, attack_damage: i32) -> Self {
        Self {
            unit_type,
            max_health,
            attack_radius,
            attack_damage,
        }
    }
}

/// A pooled unit instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    unit_type: UnitType,
    /// Ground-plane position.
    pub position: Vec2Fixed,
    /// Facing, in radians.
    #[serde(with = "fixed_serde")]
    pub heading: Fixed,
    active: bool,
    /// Nest that spawned this unit. A relation, not ownership.
    pub nest: Option<NestId>,
    health: i32,
    max_health: i32,
    #[serde(with = "fixed_serde")]
    attack_radius: Fixed,
    attack_damage: i32,
    tint: Option<Color>,
}

impl Unit {
    fn from_prototype(id: UnitId, prototype: &UnitPrototype) -> Self {
        Self {
            id,
            unit_type: prototype.unit_type,
            position: Vec2Fixed::ZERO,
            heading: Fixed::ZERO,
            active: false,
            nest: None,
            health: prototype.max_health,
            max_health: prototype.max_health,
            attack_radius: prototype.attack_radius,
            attack_damage: prototype.attack_damage,
            tint: None,
        }
    }

    /// This unit's handle.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Type tag, fixed for the lifetime of the instance.
    #[must_use]
    pub const fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// Whether the unit is currently in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current health. May be negative after a killing blow.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health on activation.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Whether health has dropped to zero or below.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Attack overlap radius.
    #[must_use]
    pub const fn attack_radius(&self) -> Fixed {
        self.attack_radius
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    /// Tint applied at spawn, if any.
    #[must_use]
    pub const fn tint(&self) -> Option<Color> {
        self.tint
    }

    /// Put the unit into play at a position, at full health.
    pub fn activate(&mut self, position: Vec2Fixed, heading: Fixed) {
        self.position = position;
        self.heading = heading;
        self.health = self.max_health;
        self.active = true;
    }

    /// Take the unit out of play and reset its transform.
    ///
    /// The nest back-reference and tint are cleared so a recycled
    /// instance carries nothing over from its previous owner.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.position = Vec2Fixed::ZERO;
        self.heading = Fixed::ZERO;
        self.nest = None;
        self.tint = None;
    }

    /// Apply a faction tint to every visual part.
    pub fn apply_tint(&mut self, color: Color) {
        self.tint = Some(color);
    }

    /// Apply damage.
    ///
    /// Inactive units ignore damage, and negative damage counts as zero.
    /// Returns `true` only on the hit that takes health from positive to
    /// zero or below.
    pub fn receive_damage(&mut self, dmg: i32) -> bool {
        if !self.active || self.is_dead() {
            return false;
        }
        self.health = self.health.saturating_sub(dmg.max(0));
        self.is_dead()
    }
}

/// Storage for every unit instance ever created.
///
/// Acts as the instantiation provider for pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitArena {
    units: Vec<Unit>,
}

impl UnitArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Create a new, inactive instance from a prototype.
    pub fn instantiate(&mut self, prototype: &UnitPrototype) -> UnitId {
        let id = UnitId(
            u32::try_from(self.units.len()).unwrap_or(u32::MAX),
        );
        self.units.push(Unit::from_prototype(id, prototype));
        id
    }

    /// Get a unit by handle.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    /// Get a mutable unit by handle.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.index())
    }

    /// Number of instances ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if no instance has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over all instances in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Iterate over units currently in play, in creation order.
    pub fn active(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.active)
    }
}
