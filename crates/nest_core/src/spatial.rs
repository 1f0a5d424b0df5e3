//! Overlap queries against units and structures.
//!
//! The physics backend is an external collaborator. Attack resolution only
//! needs "what overlaps this circle", expressed by [`SpatialQuery`]. The
//! order of the returned hits is the provider's business; callers must not
//! assume it is sorted by distance.

use serde::{Deserialize, Serialize};

use crate::components::{NestId, UnitId};
use crate::math::{Fixed, Vec2Fixed};

/// Bitmask of collidable categories.
///
/// # Example
///
/// ```
/// use nest_core::spatial::Layers;
///
/// let mask = Layers::UNITS.union(Layers::STRUCTURES);
/// assert!(mask.contains(Layers::UNITS));
/// assert!(!Layers::UNITS.intersects(Layers::STRUCTURES));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Layers(u32);

impl Layers {
    /// Mobile units.
    pub const UNITS: Self = Self(1 << 0);
    /// Nests and other buildings.
    pub const STRUCTURES: Self = Self(1 << 1);
    /// Terrain and props. Never damaged.
    pub const TERRAIN: Self = Self(1 << 2);

    /// Empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Union of flags.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Layers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Something an overlap query hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collider {
    /// A unit.
    Unit(UnitId),
    /// A nest structure.
    Nest(NestId),
    /// Anything else on a queried layer, e.g. a terrain prop.
    Obstacle,
}

impl Collider {
    /// The unit behind this collider, if it is one.
    #[must_use]
    pub const fn as_unit(self) -> Option<UnitId> {
        match self {
            Self::Unit(id) => Some(id),
            _ => None,
        }
    }

    /// The nest behind this collider, if it is one.
    #[must_use]
    pub const fn as_nest(self) -> Option<NestId> {
        match self {
            Self::Nest(id) => Some(id),
            _ => None,
        }
    }
}

/// Provider of circle overlap queries.
pub trait SpatialQuery {
    /// Everything on a layer in `mask` that overlaps the circle at `center`.
    fn overlap(&self, center: Vec2Fixed, radius: Fixed, mask: Layers) -> Vec<Collider>;
}

/// A spatial query that always returns the same hits, in order.
///
/// Useful when the physics backend lives elsewhere and the hits for an
/// attack are already known.
#[derive(Debug, Clone, Default)]
pub struct FixedHits(pub Vec<Collider>);

impl SpatialQuery for FixedHits {
    fn overlap(&self, _center: Vec2Fixed, _radius: Fixed, _mask: Layers) -> Vec<Collider> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_capabilities() {
        assert_eq!(Collider::Unit(UnitId(3)).as_unit(), Some(UnitId(3)));
        assert_eq!(Collider::Unit(UnitId(3)).as_nest(), None);
        assert_eq!(Collider::Nest(NestId(1)).as_nest(), Some(NestId(1)));
        assert_eq!(Collider::Obstacle.as_unit(), None);
        assert_eq!(Collider::Obstacle.as_nest(), None);
    }

    #[test]
    fn test_layer_union() {
        let mask = Layers::UNITS | Layers::STRUCTURES;
        assert!(mask.contains(Layers::STRUCTURES));
        assert!(!mask.intersects(Layers::TERRAIN));
        assert!(!Layers::empty().intersects(mask));
    }

    #[test]
    fn test_fixed_hits_preserves_order() {
        let hits = FixedHits(vec![Collider::Nest(NestId(0)), Collider::Unit(UnitId(9))]);
        let result = hits.overlap(Vec2Fixed::ZERO, Fixed::ONE, Layers::UNITS);
        assert_eq!(result, vec![Collider::Nest(NestId(0)), Collider::Unit(UnitId(9))]);
    }
}
