//! Nest structures: unit production, cooldown, seeding and drain.
//!
//! A nest moves through **Inactive → Active → Dead**. While active it builds
//! units on request, paying from its controller's stockpile, and a short
//! while after activation it seeds a fixed set of free starting units. When
//! it dies or is disabled every unit it spawned goes back to its pool.
//!
//! The nest does not own its controller or its units. Methods that need them
//! take them as arguments; the [`World`](crate::simulation::World) supplies
//! the right ones.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{ControllerId, NestId, UnitId};
use crate::data::NestConfig;
use crate::economy::{Controller, UnitCostManager};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed, Vec3Fixed};
use crate::pool::UnitPool;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::unit_kind::UnitType;
use crate::units::{UnitArena, UnitPrototype};

/// Lifecycle state of a nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NestState {
    /// Created or disabled; produces nothing.
    #[default]
    Inactive,
    /// Producing units.
    Active,
    /// Health reached zero. Only an explicit re-activation revives it.
    Dead,
}

/// Result of a build request that was not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildOutcome {
    /// The unit was paid for and spawned.
    Built(UnitId),
    /// The controller cannot afford the unit.
    InsufficientResources,
    /// The previous paid build was too recent.
    CooldownActive,
    /// The nest is not active.
    NestInactive,
}

impl BuildOutcome {
    /// The spawned unit, if the build went through.
    #[must_use]
    pub const fn unit(self) -> Option<UnitId> {
        match self {
            Self::Built(id) => Some(id),
            _ => None,
        }
    }
}

/// A unit-producing structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestStructure {
    id: NestId,
    controller: ControllerId,
    position: Vec2Fixed,
    config: NestConfig,
    current_health: i32,
    state: NestState,
    last_build: Option<u64>,
    pools: HashMap<UnitType, UnitPool>,
    epoch: u32,
    seeding: Option<TaskId>,
}

impl NestStructure {
    /// Create an inactive nest with no pools.
    #[must_use]
    pub fn new(id: NestId, controller: ControllerId, position: Vec2Fixed, config: NestConfig) -> Self {
        Self {
            id,
            controller,
            position,
            current_health: config.max_health,
            config,
            state: NestState::Inactive,
            last_build: None,
            pools: HashMap::new(),
            epoch: 0,
            seeding: None,
        }
    }

    /// This nest's handle.
    #[must_use]
    pub const fn id(&self) -> NestId {
        self.id
    }

    /// Controller that pays for and commands this nest's units.
    #[must_use]
    pub const fn controller(&self) -> ControllerId {
        self.controller
    }

    /// Ground-plane position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Tunables.
    #[must_use]
    pub const fn config(&self) -> &NestConfig {
        &self.config
    }

    /// Health on activation.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.config.max_health
    }

    /// Current health. Negative after overkill.
    #[must_use]
    pub const fn current_health(&self) -> i32 {
        self.current_health
    }

    /// Whether health has dropped to zero or below.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current_health <= 0
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> NestState {
        self.state
    }

    /// Whether the nest is producing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == NestState::Active
    }

    /// Tick of the last paid build, if any.
    #[must_use]
    pub const fn last_build(&self) -> Option<u64> {
        self.last_build
    }

    /// Activation counter; bumps on every [`activate`](Self::activate).
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Pool serving a unit type, once initialized.
    #[must_use]
    pub fn pool(&self, unit_type: UnitType) -> Option<&UnitPool> {
        self.pools.get(&unit_type)
    }

    /// Whether pools have been created.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.pools.is_empty()
    }

    /// Create one pre-warmed pool per buildable unit type.
    ///
    /// Runs once; later calls are ignored. Every buildable type needs a
    /// prototype.
    pub fn initialize(&mut self, arena: &mut UnitArena, prototypes: &[UnitPrototype]) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        for unit_type in UnitType::BUILDABLE {
            if !prototypes.iter().any(|p| p.unit_type == unit_type) {
                return Err(GameError::PoolMissing(unit_type));
            }
        }

        for unit_type in UnitType::BUILDABLE {
            if let Some(prototype) = prototypes.iter().find(|p| p.unit_type == unit_type) {
                let pool = UnitPool::new(prototype.clone(), arena, self.config.initial_instance_count);
                self.pools.insert(unit_type, pool);
            }
        }
        Ok(())
    }

    /// Bring the nest into play at `now`.
    ///
    /// Resets health and schedules seeding after the settle delay. A
    /// seeding task from an earlier activation is cancelled.
    pub fn activate(&mut self, now: u64, scheduler: &mut Scheduler) -> Result<TaskId> {
        if !self.is_initialized() {
            return Err(GameError::PoolMissing(UnitType::Harvester));
        }

        if let Some(stale) = self.seeding.take() {
            scheduler.cancel(stale);
        }

        self.current_health = self.config.max_health;
        self.state = NestState::Active;
        self.epoch = self.epoch.wrapping_add(1);

        let task = scheduler.schedule(
            now + u64::from(self.config.settle_delay_ticks),
            Task::SeedNest {
                nest: self.id,
                epoch: self.epoch,
            },
        );
        self.seeding = Some(task);
        Ok(task)
    }

    /// Build the free starting units: harvesters, then warriors, then blasters.
    ///
    /// Does nothing if the task belongs to an older activation or the nest
    /// is no longer active.
    pub fn seed<R: Rng + ?Sized>(
        &mut self,
        epoch: u32,
        controller: &mut Controller,
        arena: &mut UnitArena,
        rng: &mut R,
    ) -> Result<Vec<UnitId>> {
        if !self.is_active() || epoch != self.epoch {
            tracing::debug!(nest = self.id.0, epoch, "Skipping stale seeding task");
            return Ok(Vec::new());
        }
        self.seeding = None;

        let mut built = Vec::new();
        for unit_type in UnitType::BUILDABLE {
            for _ in 0..self.config.start_count(unit_type) {
                built.push(self.spawn(unit_type, controller, arena, rng)?);
            }
        }

        tracing::debug!(nest = self.id.0, count = built.len(), "Nest seeded");
        Ok(built)
    }

    /// Paid, cooldown-gated build request.
    ///
    /// Checks run in order: unit type, nest state, cost, cooldown. A refused
    /// request changes nothing; in particular an unaffordable request does
    /// not start the cooldown.
    pub fn build_unit<R: Rng + ?Sized>(
        &mut self,
        unit_type: UnitType,
        now: u64,
        controller: &mut Controller,
        arena: &mut UnitArena,
        rng: &mut R,
    ) -> Result<BuildOutcome> {
        if !unit_type.is_valid() {
            tracing::error!(nest = self.id.0, "Nest cannot build units of type 'None'");
            return Err(GameError::InvalidUnitType(unit_type));
        }

        if !self.is_active() {
            return Ok(BuildOutcome::NestInactive);
        }

        let cost = UnitCostManager::get_cost(unit_type)?;
        if !controller.can_afford(cost) {
            tracing::trace!(nest = self.id.0, cost, "Build refused: insufficient resources");
            return Ok(BuildOutcome::InsufficientResources);
        }

        if self.cooldown_active(now) {
            tracing::trace!(nest = self.id.0, "Build refused: cooldown active");
            return Ok(BuildOutcome::CooldownActive);
        }

        let id = self.spawn(unit_type, controller, arena, rng)?;
        self.last_build = Some(now);
        controller.spend(cost);
        Ok(BuildOutcome::Built(id))
    }

    /// Whether a paid build at `now` would be refused for cooldown.
    #[must_use]
    pub fn cooldown_active(&self, now: u64) -> bool {
        self.last_build
            .is_some_and(|last| now.saturating_sub(last) < u64::from(self.config.build_cooldown_ticks))
    }

    /// Take a unit out of play: drop it from the roster and return it to its pool.
    ///
    /// Returns `Ok(true)` if the pool took the unit back. Units already
    /// returned are only removed from the roster. Units spawned by a
    /// different nest are left alone.
    pub fn return_unit(
        &mut self,
        unit: UnitId,
        controller: &mut Controller,
        arena: &mut UnitArena,
    ) -> Result<bool> {
        let (unit_type, owner) = arena
            .get(unit)
            .map(|u| (u.unit_type(), u.nest))
            .ok_or(GameError::UnknownUnit(unit.0))?;

        if !unit_type.is_valid() {
            tracing::error!(nest = self.id.0, "Nest cannot return units of type 'None'");
            return Err(GameError::InvalidUnitType(unit_type));
        }

        if owner.is_some_and(|n| n != self.id) {
            return Ok(false);
        }

        controller.remove_unit(unit);
        let pool = self
            .pools
            .get_mut(&unit_type)
            .ok_or(GameError::PoolMissing(unit_type))?;
        Ok(pool.give_back(arena, unit))
    }

    /// Disable the nest, draining its units back to their pools.
    ///
    /// Returns the drained units. Does nothing unless the nest is active.
    pub fn deactivate(
        &mut self,
        controller: &mut Controller,
        arena: &mut UnitArena,
        scheduler: &mut Scheduler,
    ) -> Vec<UnitId> {
        self.shut_down(NestState::Inactive, controller, arena, scheduler)
    }

    /// Apply damage. Returns the drained units if this hit destroyed the nest.
    ///
    /// Damage to a nest that is not active is ignored, so death and its
    /// drain happen exactly once. Negative damage counts as zero.
    pub fn receive_damage(
        &mut self,
        dmg: i32,
        controller: &mut Controller,
        arena: &mut UnitArena,
        scheduler: &mut Scheduler,
    ) -> Option<Vec<UnitId>> {
        if !self.is_active() {
            return None;
        }

        self.current_health = self.current_health.saturating_sub(dmg.max(0));
        if self.is_dead() {
            tracing::debug!(nest = self.id.0, health = self.current_health, "Nest destroyed");
            Some(self.shut_down(NestState::Dead, controller, arena, scheduler))
        } else {
            None
        }
    }

    fn shut_down(
        &mut self,
        next: NestState,
        controller: &mut Controller,
        arena: &mut UnitArena,
        scheduler: &mut Scheduler,
    ) -> Vec<UnitId> {
        if !self.is_active() {
            return Vec::new();
        }
        self.state = next;

        if let Some(task) = self.seeding.take() {
            scheduler.cancel(task);
        }

        // Every return shrinks the roster, so walk a copy.
        let attributed: Vec<UnitId> = controller
            .units()
            .iter()
            .copied()
            .filter(|&id| arena.get(id).is_some_and(|u| u.nest == Some(self.id)))
            .collect();

        let mut drained = Vec::with_capacity(attributed.len());
        for unit in attributed {
            match self.return_unit(unit, controller, arena) {
                Ok(true) => drained.push(unit),
                Ok(false) => {}
                Err(e) => tracing::warn!(nest = self.id.0, unit = unit.0, "Drain failed: {e}"),
            }
        }
        drained
    }

    /// Spawn a unit without cost or cooldown checks.
    fn spawn<R: Rng + ?Sized>(
        &mut self,
        unit_type: UnitType,
        controller: &mut Controller,
        arena: &mut UnitArena,
        rng: &mut R,
    ) -> Result<UnitId> {
        let offset = Vec3Fixed::random_unit_sphere(rng)
            .ground()
            .scale(self.config.spawn_distance);
        let position = self.position + offset;

        let pool = self
            .pools
            .get_mut(&unit_type)
            .ok_or(GameError::PoolMissing(unit_type))?;
        let id = pool.get(arena, position, Fixed::ZERO);

        if let Some(unit) = arena.get_mut(id) {
            unit.nest = Some(self.id);
            unit.apply_tint(controller.color());
        }
        controller.add_unit(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Color;
    use crate::data::NestData;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        nest: NestStructure,
        controller: Controller,
        arena: UnitArena,
        scheduler: Scheduler,
        rng: StdRng,
    }

    fn fixture(resources: i32) -> Fixture {
        let data = NestData::default();
        let prototypes: Vec<_> = data.units.iter().map(|u| u.to_prototype()).collect();
        let mut arena = UnitArena::new();
        let mut nest = NestStructure::new(
            NestId(0),
            ControllerId(0),
            Vec2Fixed::from_ints(10, 10),
            data.config,
        );
        nest.initialize(&mut arena, &prototypes).unwrap();
        let mut scheduler = Scheduler::new();
        nest.activate(0, &mut scheduler).unwrap();
        Fixture {
            nest,
            controller: Controller::new(ControllerId(0), resources, Color::RED),
            arena,
            scheduler,
            rng: StdRng::seed_from_u64(1),
        }
    }

    impl Fixture {
        fn build(&mut self, unit_type: UnitType, now: u64) -> Result<BuildOutcome> {
            self.nest.build_unit(
                unit_type,
                now,
                &mut self.controller,
                &mut self.arena,
                &mut self.rng,
            )
        }
    }

    #[test]
    fn test_initialize_prewarms_pools() {
        let f = fixture(0);
        for unit_type in UnitType::BUILDABLE {
            assert_eq!(f.nest.pool(unit_type).unwrap().available_count(), 30);
        }
        assert!(f.nest.pool(UnitType::None).is_none());
        assert_eq!(f.arena.len(), 90);
    }

    #[test]
    fn test_initialize_requires_every_prototype() {
        let mut arena = UnitArena::new();
        let mut nest = NestStructure::new(
            NestId(0),
            ControllerId(0),
            Vec2Fixed::ZERO,
            NestConfig::default(),
        );
        let only_warriors = [UnitPrototype::new(UnitType::Warrior, 10, Fixed::ONE, 1)];
        assert_eq!(
            nest.initialize(&mut arena, &only_warriors),
            Err(GameError::PoolMissing(UnitType::Harvester))
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn test_activate_requires_pools() {
        let mut nest = NestStructure::new(
            NestId(0),
            ControllerId(0),
            Vec2Fixed::ZERO,
            NestConfig::default(),
        );
        let mut scheduler = Scheduler::new();
        assert!(nest.activate(0, &mut scheduler).is_err());
        assert_eq!(nest.state(), NestState::Inactive);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_build_success_debits_and_registers() {
        let mut f = fixture(100);
        let outcome = f.build(UnitType::Warrior, 5).unwrap();
        let id = outcome.unit().unwrap();

        assert_eq!(f.controller.resources, 50);
        assert_eq!(f.controller.units(), &[id]);
        assert_eq!(f.nest.last_build(), Some(5));

        let unit = f.arena.get(id).unwrap();
        assert!(unit.is_active());
        assert_eq!(unit.nest, Some(NestId(0)));
        assert_eq!(unit.tint(), Some(Color::RED));
        assert_eq!(f.nest.pool(UnitType::Warrior).unwrap().in_use_count(), 1);
    }

    #[test]
    fn test_build_none_is_rejected() {
        let mut f = fixture(100);
        assert_eq!(
            f.build(UnitType::None, 5),
            Err(GameError::InvalidUnitType(UnitType::None))
        );
        assert_eq!(f.controller.resources, 100);
        assert!(f.controller.units().is_empty());
        assert_eq!(f.nest.last_build(), None);
    }

    #[test]
    fn test_unaffordable_build_does_not_start_cooldown() {
        let mut f = fixture(40);
        assert_eq!(
            f.build(UnitType::Warrior, 100).unwrap(),
            BuildOutcome::InsufficientResources
        );
        assert_eq!(f.controller.resources, 40);
        assert_eq!(f.nest.last_build(), None);

        // A cheaper unit right away is not blocked by a cooldown.
        assert!(matches!(
            f.build(UnitType::Harvester, 100).unwrap(),
            BuildOutcome::Built(_)
        ));
    }

    #[test]
    fn test_cooldown_blocks_second_build() {
        let mut f = fixture(1000);
        assert!(f.build(UnitType::Harvester, 100).unwrap().unit().is_some());
        assert_eq!(
            f.build(UnitType::Harvester, 102).unwrap(),
            BuildOutcome::CooldownActive
        );
        assert_eq!(f.controller.resources, 975);
        assert_eq!(f.nest.last_build(), Some(100));

        // Exactly one cooldown later the build goes through.
        assert!(f.build(UnitType::Harvester, 110).unwrap().unit().is_some());
        assert_eq!(f.controller.resources, 950);
    }

    #[test]
    fn test_spawn_within_distance() {
        let mut f = fixture(10_000);
        let center = f.nest.position();
        let radius = f.nest.config().spawn_distance;
        for i in 0..20 {
            let id = f.build(UnitType::Harvester, i * 100).unwrap().unit().unwrap();
            let pos = f.arena.get(id).unwrap().position;
            // Allow a hair for fixed-point rounding in normalization.
            assert!(center.within(pos, radius + Fixed::ONE / Fixed::from_num(1000)));
        }
    }

    #[test]
    fn test_return_unit_is_idempotent() {
        let mut f = fixture(100);
        let id = f.build(UnitType::Warrior, 0).unwrap().unit().unwrap();

        assert_eq!(f.nest.return_unit(id, &mut f.controller, &mut f.arena), Ok(true));
        assert_eq!(f.nest.return_unit(id, &mut f.controller, &mut f.arena), Ok(false));
        assert!(f.controller.units().is_empty());
        let pool = f.nest.pool(UnitType::Warrior).unwrap();
        assert_eq!(pool.available_count(), 30);
        assert_eq!(pool.in_use_count(), 0);
    }

    #[test]
    fn test_return_unknown_unit() {
        let mut f = fixture(0);
        assert_eq!(
            f.nest
                .return_unit(UnitId(9999), &mut f.controller, &mut f.arena),
            Err(GameError::UnknownUnit(9999))
        );
    }

    #[test]
    fn test_seed_builds_free_units_in_order() {
        let mut f = fixture(0);
        let epoch = f.nest.epoch();
        let built = f
            .nest
            .seed(epoch, &mut f.controller, &mut f.arena, &mut f.rng)
            .unwrap();

        let types: Vec<_> = built
            .iter()
            .map(|&id| f.arena.get(id).unwrap().unit_type())
            .collect();
        assert_eq!(
            types,
            vec![
                UnitType::Harvester,
                UnitType::Harvester,
                UnitType::Harvester,
                UnitType::Warrior,
                UnitType::Warrior,
                UnitType::Blaster,
            ]
        );
        assert_eq!(f.controller.resources, 0);
        assert_eq!(f.nest.last_build(), None);
    }

    #[test]
    fn test_stale_seed_is_noop() {
        let mut f = fixture(0);
        let stale = f.nest.epoch().wrapping_sub(1);
        let built = f
            .nest
            .seed(stale, &mut f.controller, &mut f.arena, &mut f.rng)
            .unwrap();
        assert!(built.is_empty());
        assert!(f.controller.units().is_empty());
    }

    #[test]
    fn test_damage_to_death_drains_once() {
        let mut f = fixture(1000);
        for i in 0..4 {
            f.build(UnitType::Warrior, i * 10).unwrap();
        }

        assert!(f
            .nest
            .receive_damage(999, &mut f.controller, &mut f.arena, &mut f.scheduler)
            .is_none());
        let drained = f
            .nest
            .receive_damage(201, &mut f.controller, &mut f.arena, &mut f.scheduler)
            .unwrap();

        assert_eq!(drained.len(), 4);
        assert_eq!(f.nest.current_health(), -200);
        assert!(f.nest.is_dead());
        assert_eq!(f.nest.state(), NestState::Dead);
        assert!(f.controller.units().is_empty());
        assert_eq!(f.scheduler.pending_count(), 0);

        assert!(f
            .nest
            .receive_damage(50, &mut f.controller, &mut f.arena, &mut f.scheduler)
            .is_none());
        assert_eq!(f.nest.current_health(), -200);
    }

    #[test]
    fn test_negative_damage_never_heals() {
        let mut f = fixture(0);
        f.nest
            .receive_damage(300, &mut f.controller, &mut f.arena, &mut f.scheduler);
        assert_eq!(f.nest.current_health(), 700);

        for dmg in [-5000, i32::MIN] {
            assert!(f
                .nest
                .receive_damage(dmg, &mut f.controller, &mut f.arena, &mut f.scheduler)
                .is_none());
            assert_eq!(f.nest.current_health(), 700);
        }

        let drained = f
            .nest
            .receive_damage(i32::MAX, &mut f.controller, &mut f.arena, &mut f.scheduler);
        assert!(drained.is_some());
        assert_eq!(f.nest.current_health(), 700 - i32::MAX);
    }

    #[test]
    fn test_return_none_typed_unit_changes_nothing() {
        let mut f = fixture(100);
        let ours = f.build(UnitType::Harvester, 0).unwrap().unit().unwrap();
        let bogus = f
            .arena
            .instantiate(&UnitPrototype::new(UnitType::None, 10, Fixed::ZERO, 0));
        let counts = |nest: &NestStructure| -> Vec<(usize, usize)> {
            UnitType::BUILDABLE
                .iter()
                .map(|&t| {
                    let pool = nest.pool(t).unwrap();
                    (pool.available_count(), pool.in_use_count())
                })
                .collect()
        };
        let before = counts(&f.nest);

        assert_eq!(
            f.nest.return_unit(bogus, &mut f.controller, &mut f.arena),
            Err(GameError::InvalidUnitType(UnitType::None))
        );
        assert_eq!(counts(&f.nest), before);
        assert_eq!(f.controller.units(), &[ours]);
        assert_eq!(f.controller.resources, 75);
        assert!(f.arena.get(ours).unwrap().is_active());
    }

    #[test]
    fn test_dead_nest_refuses_builds() {
        let mut f = fixture(1000);
        f.nest
            .receive_damage(5000, &mut f.controller, &mut f.arena, &mut f.scheduler);
        assert_eq!(
            f.build(UnitType::Harvester, 100).unwrap(),
            BuildOutcome::NestInactive
        );
        assert_eq!(f.controller.resources, 1000);
    }

    #[test]
    fn test_reactivation_resets_health() {
        let mut f = fixture(0);
        f.nest
            .receive_damage(5000, &mut f.controller, &mut f.arena, &mut f.scheduler);
        f.nest.activate(50, &mut f.scheduler).unwrap();

        assert_eq!(f.nest.current_health(), 1000);
        assert!(f.nest.is_active());
        assert_eq!(f.scheduler.pending_count(), 1);
    }

    #[test]
    fn test_drain_leaves_other_nests_units() {
        let mut f = fixture(1000);
        let ours = f.build(UnitType::Warrior, 0).unwrap().unit().unwrap();

        let data = NestData::default();
        let prototypes: Vec<_> = data.units.iter().map(|u| u.to_prototype()).collect();
        let mut sibling = NestStructure::new(NestId(1), ControllerId(0), Vec2Fixed::ZERO, data.config);
        sibling.initialize(&mut f.arena, &prototypes).unwrap();
        sibling.activate(0, &mut f.scheduler).unwrap();
        let theirs = sibling
            .build_unit(UnitType::Warrior, 0, &mut f.controller, &mut f.arena, &mut f.rng)
            .unwrap()
            .unit()
            .unwrap();

        let drained = f
            .nest
            .deactivate(&mut f.controller, &mut f.arena, &mut f.scheduler);

        assert_eq!(drained, vec![ours]);
        assert_eq!(f.controller.units(), &[theirs]);
        assert!(f.arena.get(theirs).unwrap().is_active());
        assert_eq!(f.nest.state(), NestState::Inactive);
    }
}
