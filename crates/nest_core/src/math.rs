//! Fixed-point math utilities for deterministic simulation.
//!
//! All positions, radii and distances use fixed-point arithmetic so two
//! worlds built from the same seed produce bit-identical state on any CPU.
//!
//! The ground plane is two-dimensional. A nest and every unit it spawns share
//! the nest's ground height, so height is never stored; [`Vec3Fixed`] exists
//! only to sample spawn directions on the unit sphere before they are
//! flattened onto the ground.

use fixed::types::I32F32;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point position or offset on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate (ground plane depth, not height).
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole numbers.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Saturates at `Fixed::MAX` for points too far apart to square.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Check whether `other` lies within `radius` of this point (inclusive).
    #[must_use]
    pub fn within(self, other: Self, radius: Fixed) -> bool {
        self.distance_squared(other) <= radius.saturating_mul(radius)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Scale both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Fixed-point 3D direction, used for spawn sampling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vec3Fixed {
    /// X component (ground plane).
    pub x: Fixed,
    /// Vertical component.
    pub up: Fixed,
    /// Y component (ground plane depth).
    pub y: Fixed,
}

impl Vec3Fixed {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: Fixed, up: Fixed, y: Fixed) -> Self {
        Self { x, up, y }
    }

    /// Squared length.
    #[must_use]
    pub fn length_squared(self) -> Fixed {
        self.x * self.x + self.up * self.up + self.y * self.y
    }

    /// Normalize to unit length. The zero vector stays zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = fixed_sqrt(self.length_squared());
        if len == Fixed::ZERO {
            return Self::default();
        }
        Self::new(self.x / len, self.up / len, self.y / len)
    }

    /// Drop the vertical component, projecting onto the ground plane.
    #[must_use]
    pub const fn ground(self) -> Vec2Fixed {
        Vec2Fixed::new(self.x, self.y)
    }

    /// Sample a uniformly distributed point on the unit sphere.
    ///
    /// Rejection-samples the unit ball using raw fixed-point bits so the
    /// result depends only on the RNG stream.
    pub fn random_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let one_bits = Fixed::ONE.to_bits();
        // Anything shorter than this normalizes poorly in 32 fractional bits.
        let min_len_sq = Fixed::from_bits(1 << 20);
        loop {
            let candidate = Self::new(
                Fixed::from_bits(rng.random_range(-one_bits..=one_bits)),
                Fixed::from_bits(rng.random_range(-one_bits..=one_bits)),
                Fixed::from_bits(rng.random_range(-one_bits..=one_bits)),
            );
            let len_sq = candidate.length_squared();
            if len_sq > min_len_sq && len_sq <= Fixed::ONE {
                return candidate.normalize();
            }
        }
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_within_is_inclusive() {
        let a = Vec2Fixed::from_ints(0, 0);
        let b = Vec2Fixed::from_ints(3, 4);
        assert!(a.within(b, Fixed::from_num(5)));
        assert!(!a.within(b, Fixed::from_num(4)));
    }

    #[test]
    fn test_distance_squared_saturates_far_apart() {
        let a = Vec2Fixed::from_ints(-50_000, 0);
        let b = Vec2Fixed::from_ints(50_000, 50_000);
        assert_eq!(a.distance_squared(b), Fixed::MAX);
        assert!(!a.within(b, Fixed::from_num(6)));
        assert!(a.within(b, Fixed::MAX));
    }

    #[test]
    fn test_fixed_sqrt() {
        assert_eq!(fixed_sqrt(Fixed::from_num(25)), Fixed::from_num(5));
        assert_eq!(fixed_sqrt(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(fixed_sqrt(Fixed::from_num(-4)), Fixed::ZERO);
    }

    #[test]
    fn test_unit_sphere_samples_have_unit_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let epsilon = Fixed::ONE / Fixed::from_num(10_000);
        for _ in 0..200 {
            let dir = Vec3Fixed::random_unit_sphere(&mut rng);
            let len_sq = dir.length_squared();
            assert!(
                (len_sq - Fixed::ONE).abs() < epsilon,
                "expected unit length, got {len_sq:?}"
            );
            // The ground projection can only shrink.
            assert!(dir.ground().dot(dir.ground()) <= Fixed::ONE + epsilon);
        }
    }

    #[test]
    fn test_unit_sphere_sampling_is_seeded() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                Vec3Fixed::random_unit_sphere(&mut a),
                Vec3Fixed::random_unit_sphere(&mut b)
            );
        }
    }
}
