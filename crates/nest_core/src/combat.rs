//! Attack target selection.
//!
//! Given the hits of an overlap query, decide who an attack damages. Damage
//! is applied by the [`World`](crate::simulation::World); this module only
//! picks targets, so the policy can be tested without any world state.
//!
//! - **Single target** (warriors): the first hit, in query order, that is a
//!   unit or a nest. Not the closest one.
//! - **Area** (blasters): every hit that is a unit or a nest.
//!
//! The attacker never targets itself, even though its own collider is
//! inside its attack radius.

use crate::components::{NestId, UnitId};
use crate::spatial::Collider;
use crate::unit_kind::AttackStyle;

/// Something an attack damages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackTarget {
    /// A unit.
    Unit(UnitId),
    /// A nest structure.
    Nest(NestId),
}

impl AttackTarget {
    fn from_collider(collider: Collider) -> Option<Self> {
        collider
            .as_unit()
            .map(Self::Unit)
            .or_else(|| collider.as_nest().map(Self::Nest))
    }
}

/// Pick the targets of an attack from overlap query hits.
#[must_use]
pub fn select_targets(attacker: UnitId, style: AttackStyle, hits: &[Collider]) -> Vec<AttackTarget> {
    let mut candidates = hits
        .iter()
        .filter_map(|&hit| AttackTarget::from_collider(hit))
        .filter(|&target| target != AttackTarget::Unit(attacker));

    match style {
        AttackStyle::Passive => Vec::new(),
        AttackStyle::SingleTarget => candidates.next().into_iter().collect(),
        AttackStyle::Area => candidates.collect(),
    }
}
