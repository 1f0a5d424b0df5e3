//! Unit type tags and per-type attack behavior.
//!
//! Unit behavior is selected by [`UnitType`] rather than by a trait object per
//! unit: every unit instance is the same [`Unit`](crate::units::Unit) struct,
//! and [`UnitType::attack_style`] decides how its attacks resolve.
//!
//! # Example
//!
//! ```
//! use nest_core::unit_kind::{AttackStyle, UnitType};
//!
//! assert_eq!(UnitType::Warrior.attack_style(), AttackStyle::SingleTarget);
//! assert!(!UnitType::None.is_valid());
//! ```

use serde::{Deserialize, Serialize};

/// Unit type tag.
///
/// `None` is a sentinel for "unset"; build and return operations reject it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum UnitType {
    /// Invalid / unset.
    #[default]
    None,
    /// Gathers resources; cannot attack.
    Harvester,
    /// Melee fighter that hits a single target per attack.
    Warrior,
    /// Area attacker that damages everything in range and is consumed.
    Blaster,
}

impl UnitType {
    /// Every buildable unit type, in seeding order.
    pub const BUILDABLE: [Self; 3] = [Self::Harvester, Self::Warrior, Self::Blaster];

    /// Whether this is a real unit type (not the `None` sentinel).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::None)
    }

    /// How units of this type resolve an attack.
    #[must_use]
    pub const fn attack_style(self) -> AttackStyle {
        match self {
            Self::None | Self::Harvester => AttackStyle::Passive,
            Self::Warrior => AttackStyle::SingleTarget,
            Self::Blaster => AttackStyle::Area,
        }
    }

    /// Short lowercase name, used for logging and data keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Harvester => "harvester",
            Self::Warrior => "warrior",
            Self::Blaster => "blaster",
        }
    }
}

/// Attack resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackStyle {
    /// Never attacks.
    Passive,
    /// Damages the first unit or nest the overlap query enumerates, then stops.
    ///
    /// Query order wins, not distance.
    SingleTarget,
    /// Damages every unit and nest the overlap query returns, then the
    /// attacker is consumed.
    Area,
}

impl AttackStyle {
    /// Whether this style ever deals damage.
    #[must_use]
    pub const fn can_attack(self) -> bool {
        !matches!(self, Self::Passive)
    }

    /// Whether the attacker is used up by attacking.
    #[must_use]
    pub const fn consumes_attacker(self) -> bool {
        matches!(self, Self::Area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buildable_excludes_none() {
        assert!(UnitType::BUILDABLE.iter().all(|t| t.is_valid()));
        assert!(!UnitType::BUILDABLE.contains(&UnitType::None));
    }

    #[test]
    fn test_attack_styles() {
        assert_eq!(UnitType::Harvester.attack_style(), AttackStyle::Passive);
        assert_eq!(UnitType::Warrior.attack_style(), AttackStyle::SingleTarget);
        assert_eq!(UnitType::Blaster.attack_style(), AttackStyle::Area);
        assert!(!AttackStyle::Passive.can_attack());
        assert!(AttackStyle::Area.consumes_attacker());
        assert!(!AttackStyle::SingleTarget.consumes_attacker());
    }

    #[test]
    fn test_default_is_none() {
        assert_eq!(UnitType::default(), UnitType::None);
    }
}
