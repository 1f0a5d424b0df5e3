//! Object pool of reusable unit instances.
//!
//! A pool hands out instances of exactly one [`UnitType`] and takes them
//! back when they die or are drained. Every instance the pool has created
//! is either available or in use, never both.
//!
//! The pool grows without bound: when nothing is available a new instance
//! is made from the prototype rather than failing the spawn.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::math::{Fixed, Vec2Fixed};
use crate::unit_kind::UnitType;
use crate::units::{UnitArena, UnitPrototype};

/// Pool of inactive unit instances for one unit type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPool {
    prototype: UnitPrototype,
    /// Stack of ready instances; the most recently returned is reused first.
    available: Vec<UnitId>,
    in_use: BTreeSet<UnitId>,
}

impl UnitPool {
    /// Create a pool and pre-warm it with `initial_count` inactive instances.
    pub fn new(prototype: UnitPrototype, arena: &mut UnitArena, initial_count: u32) -> Self {
        let available = (0..initial_count)
            .map(|_| arena.instantiate(&prototype))
            .collect();
        Self {
            prototype,
            available,
            in_use: BTreeSet::new(),
        }
    }

    /// Unit type this pool serves.
    #[must_use]
    pub const fn unit_type(&self) -> UnitType {
        self.prototype.unit_type
    }

    /// Number of instances ready to be handed out.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Number of instances currently in play.
    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }

    /// Total instances this pool has created.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.available.len() + self.in_use.len()
    }

    /// Whether `id` is currently handed out by this pool.
    #[must_use]
    pub fn is_in_use(&self, id: UnitId) -> bool {
        self.in_use.contains(&id)
    }

    /// Hand out an instance, activated at `position` facing `heading`.
    pub fn get(&mut self, arena: &mut UnitArena, position: Vec2Fixed, heading: Fixed) -> UnitId {
        let id = match self.available.pop() {
            Some(id) => id,
            None => {
                let id = arena.instantiate(&self.prototype);
                tracing::debug!(
                    unit_type = self.prototype.unit_type.name(),
                    total = self.total_count() + 1,
                    "Pool exhausted, created new instance"
                );
                id
            }
        };

        self.in_use.insert(id);
        if let Some(unit) = arena.get_mut(id) {
            unit.activate(position, heading);
        }

        self.check_invariants();
        id
    }

    /// Take an instance back: deactivate it, reset its transform, mark it available.
    ///
    /// Ids that are not currently in use (already returned, or never from
    /// this pool) are ignored and `false` is returned.
    pub fn give_back(&mut self, arena: &mut UnitArena, id: UnitId) -> bool {
        if !self.in_use.remove(&id) {
            return false;
        }

        if let Some(unit) = arena.get_mut(id) {
            unit.deactivate();
        }
        self.available.push(id);

        self.check_invariants();
        true
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        debug_assert!(
            self.available.iter().all(|id| !self.in_use.contains(id)),
            "pooled unit is both available and in use"
        );
    }

    #[cfg(not(feature = "debug-validation"))]
    #[inline]
    fn check_invariants(&self) {}
}
