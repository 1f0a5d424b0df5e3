//! Core simulation loop.
//!
//! A [`World`] owns every controller, nest and unit instance, the timer
//! queue and the seeded RNG used for spawn offsets. All mutation goes
//! through it, one call at a time; nothing here runs concurrently.
//!
//! # Determinism
//!
//! - Positions and radii are fixed-point ([`Fixed`])
//! - Randomness comes only from the world's seeded RNG
//! - Registries iterate in creation order
//! - Same seed and same calls always produce the same [`World::state_hash`]
//!
//! # Example
//!
//! ```
//! use nest_core::components::Color;
//! use nest_core::data::NestData;
//! use nest_core::math::Vec2Fixed;
//! use nest_core::simulation::World;
//! use nest_core::unit_kind::UnitType;
//!
//! let mut world = World::new(42);
//! let ai = world.add_controller(500, Color::RED);
//! let nest = world.add_nest(ai, Vec2Fixed::ZERO, &NestData::default()).unwrap();
//! world.activate_nest(nest).unwrap();
//!
//! // Starting units arrive one second after activation.
//! for _ in 0..20 {
//!     world.tick();
//! }
//! assert_eq!(world.controller(ai).unwrap().units().len(), 6);
//!
//! let outcome = world.build_unit(nest, UnitType::Warrior).unwrap();
//! assert!(outcome.unit().is_some());
//! assert_eq!(world.controller(ai).unwrap().resources, 450);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::combat::{select_targets, AttackTarget};
use crate::components::{Color, ControllerId, NestId, UnitId};
use crate::data::NestData;
use crate::economy::Controller;
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::nest::{BuildOutcome, NestStructure};
use crate::scheduler::{Scheduler, Task};
use crate::spatial::{Collider, Layers, SpatialQuery};
use crate::unit_kind::UnitType;
use crate::units::{Unit, UnitArena};

/// Ticks per second for the simulation.
pub const TICK_RATE: u32 = 20;

/// Duration of one tick in milliseconds.
pub const TICK_DURATION_MS: u32 = 1000 / TICK_RATE;

/// Something observable that happened in the world.
///
/// The game layer can use these to trigger effects, sounds, UI updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestEvent {
    /// A unit entered play.
    UnitBuilt {
        /// Nest that built it.
        nest: NestId,
        /// The new unit.
        unit: UnitId,
        /// Its type.
        unit_type: UnitType,
        /// Whether resources were spent (false for seeded units).
        paid: bool,
    },
    /// A unit went back to its pool.
    UnitReturned {
        /// Nest whose pool took it.
        nest: NestId,
        /// The unit.
        unit: UnitId,
    },
    /// A nest built its starting units.
    NestSeeded {
        /// The nest.
        nest: NestId,
        /// Units built.
        count: usize,
    },
    /// A nest's health reached zero.
    NestDestroyed {
        /// The nest.
        nest: NestId,
    },
    /// An attack landed.
    DamageDealt {
        /// Attacking unit.
        attacker: UnitId,
        /// Who was hit.
        target: AttackTarget,
        /// Damage applied.
        damage: i32,
    },
}

/// Borrowed pieces a nest needs to act.
struct NestParts<'a> {
    nest: &'a mut NestStructure,
    controller: &'a mut Controller,
    units: &'a mut UnitArena,
    scheduler: &'a mut Scheduler,
    rng: &'a mut StdRng,
}

/// The nest production simulation.
#[derive(Debug, Clone)]
pub struct World {
    tick: u64,
    units: UnitArena,
    nests: Vec<NestStructure>,
    controllers: Vec<Controller>,
    scheduler: Scheduler,
    rng: StdRng,
    events: Vec<NestEvent>,
}

impl World {
    /// Create an empty world whose spawn offsets derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            units: UnitArena::new(),
            nests: Vec::new(),
            controllers: Vec::new(),
            scheduler: Scheduler::new(),
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Current tick.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Every unit instance ever created.
    #[must_use]
    pub fn units(&self) -> &UnitArena {
        &self.units
    }

    /// Get a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Get a nest.
    #[must_use]
    pub fn nest(&self, id: NestId) -> Option<&NestStructure> {
        self.nests.get(id.index())
    }

    /// All nests, in creation order.
    #[must_use]
    pub fn nests(&self) -> &[NestStructure] {
        &self.nests
    }

    /// Get a controller.
    #[must_use]
    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.controllers.get(id.index())
    }

    /// Get a controller mutably, e.g. to credit harvested resources.
    pub fn controller_mut(&mut self, id: ControllerId) -> Option<&mut Controller> {
        self.controllers.get_mut(id.index())
    }

    /// All controllers, in creation order.
    #[must_use]
    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Register an AI controller.
    pub fn add_controller(&mut self, resources: i32, color: Color) -> ControllerId {
        let id = ControllerId(index_to_u32(self.controllers.len()));
        self.controllers.push(Controller::new(id, resources, color));
        id
    }

    /// Create an inactive nest for `controller` and pre-warm its pools.
    pub fn add_nest(&mut self, controller: ControllerId, position: Vec2Fixed, data: &NestData) -> Result<NestId> {
        if self.controller(controller).is_none() {
            return Err(GameError::UnknownController(controller.0));
        }
        data.validate()?;

        let id = NestId(index_to_u32(self.nests.len()));
        let mut nest = NestStructure::new(id, controller, position, data.config.clone());
        let prototypes: Vec<_> = data.units.iter().map(|u| u.to_prototype()).collect();
        nest.initialize(&mut self.units, &prototypes)?;
        self.nests.push(nest);
        Ok(id)
    }

    /// Bring a nest into play. Starting units follow after the settle delay.
    pub fn activate_nest(&mut self, id: NestId) -> Result<()> {
        let now = self.tick;
        let nest = self
            .nests
            .get_mut(id.index())
            .ok_or(GameError::UnknownNest(id.0))?;
        nest.activate(now, &mut self.scheduler)?;
        Ok(())
    }

    /// Disable a nest and return its units to their pools.
    pub fn deactivate_nest(&mut self, id: NestId) -> Result<Vec<UnitId>> {
        let parts = self.nest_parts(id)?;
        let drained = parts
            .nest
            .deactivate(parts.controller, parts.units, parts.scheduler);
        self.record_returns(id, &drained);
        Ok(drained)
    }

    /// Paid build request from an AI controller.
    pub fn build_unit(&mut self, id: NestId, unit_type: UnitType) -> Result<BuildOutcome> {
        let now = self.tick;
        let parts = self.nest_parts(id)?;
        let outcome = parts
            .nest
            .build_unit(unit_type, now, parts.controller, parts.units, parts.rng)?;
        if let BuildOutcome::Built(unit) = outcome {
            self.events.push(NestEvent::UnitBuilt {
                nest: id,
                unit,
                unit_type,
                paid: true,
            });
        }
        Ok(outcome)
    }

    /// Return a unit to the given nest's pool.
    pub fn return_unit(&mut self, id: NestId, unit: UnitId) -> Result<bool> {
        let parts = self.nest_parts(id)?;
        let returned = parts.nest.return_unit(unit, parts.controller, parts.units)?;
        if returned {
            self.record_returns(id, &[unit]);
        }
        Ok(returned)
    }

    /// Damage a nest. Returns `true` if this destroyed it.
    pub fn damage_nest(&mut self, id: NestId, dmg: i32) -> Result<bool> {
        let parts = self.nest_parts(id)?;
        match parts
            .nest
            .receive_damage(dmg, parts.controller, parts.units, parts.scheduler)
        {
            Some(drained) => {
                self.record_returns(id, &drained);
                self.events.push(NestEvent::NestDestroyed { nest: id });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Damage a unit. Returns `true` if this killed it; the dead unit goes
    /// back to its nest's pool.
    pub fn damage_unit(&mut self, id: UnitId, dmg: i32) -> Result<bool> {
        let killed = self
            .units
            .get_mut(id)
            .ok_or(GameError::UnknownUnit(id.0))?
            .receive_damage(dmg);
        if killed {
            self.retire_unit(id)?;
        }
        Ok(killed)
    }

    /// Place an active unit somewhere else. Inactive units stay where the
    /// pool parked them; returns whether the unit moved.
    pub fn move_unit(&mut self, id: UnitId, position: Vec2Fixed) -> Result<bool> {
        let unit = self.units.get_mut(id).ok_or(GameError::UnknownUnit(id.0))?;
        if !unit.is_active() {
            return Ok(false);
        }
        unit.position = position;
        Ok(true)
    }

    /// Attack with `attacker`, resolving hits against this world's units and nests.
    pub fn attack(&mut self, attacker: UnitId, dmg: i32) -> Result<Vec<AttackTarget>> {
        let hits = match self.attack_query(attacker)? {
            Some((center, radius)) => self.overlap(center, radius, attack_mask()),
            None => return Ok(Vec::new()),
        };
        self.resolve_attack(attacker, dmg, &hits)
    }

    /// Attack with `attacker`, resolving hits through an external query provider.
    pub fn attack_with(
        &mut self,
        attacker: UnitId,
        dmg: i32,
        query: &dyn SpatialQuery,
    ) -> Result<Vec<AttackTarget>> {
        let hits = match self.attack_query(attacker)? {
            Some((center, radius)) => query.overlap(center, radius, attack_mask()),
            None => return Ok(Vec::new()),
        };
        self.resolve_attack(attacker, dmg, &hits)
    }

    /// Advance the simulation by one tick and run any timers now due.
    ///
    /// Returns every event recorded since the last drain.
    pub fn tick(&mut self) -> Vec<NestEvent> {
        self.tick += 1;

        for task in self.scheduler.take_due(self.tick) {
            self.run_task(task);
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "World state hash");
        }

        self.take_events()
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<NestEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deterministic hash of the observable state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);

        for controller in &self.controllers {
            controller.resources.hash(&mut hasher);
            controller.units().hash(&mut hasher);
        }

        for nest in &self.nests {
            nest.current_health().hash(&mut hasher);
            nest.state().hash(&mut hasher);
            nest.last_build().hash(&mut hasher);
            for unit_type in UnitType::BUILDABLE {
                if let Some(pool) = nest.pool(unit_type) {
                    pool.available_count().hash(&mut hasher);
                    pool.in_use_count().hash(&mut hasher);
                }
            }
        }

        self.units.len().hash(&mut hasher);
        for unit in self.units.active() {
            unit.id().hash(&mut hasher);
            unit.position.x.to_bits().hash(&mut hasher);
            unit.position.y.to_bits().hash(&mut hasher);
            unit.health().hash(&mut hasher);
            unit.nest.hash(&mut hasher);
        }

        hasher.finish()
    }

    fn nest_parts(&mut self, id: NestId) -> Result<NestParts<'_>> {
        let nest = self
            .nests
            .get_mut(id.index())
            .ok_or(GameError::UnknownNest(id.0))?;
        let controller_id = nest.controller();
        let controller = self
            .controllers
            .get_mut(controller_id.index())
            .ok_or(GameError::UnknownController(controller_id.0))?;
        Ok(NestParts {
            nest,
            controller,
            units: &mut self.units,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
        })
    }

    fn record_returns(&mut self, nest: NestId, units: &[UnitId]) {
        self.events.extend(
            units
                .iter()
                .map(|&unit| NestEvent::UnitReturned { nest, unit }),
        );
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SeedNest { nest, epoch } => {
                let parts = match self.nest_parts(nest) {
                    Ok(parts) => parts,
                    Err(e) => {
                        tracing::warn!("Seeding task for missing nest: {e}");
                        return;
                    }
                };
                match parts.nest.seed(epoch, parts.controller, parts.units, parts.rng) {
                    Ok(built) if built.is_empty() => {}
                    Ok(built) => {
                        for &unit in &built {
                            let unit_type = self.units.get(unit).map_or(UnitType::None, Unit::unit_type);
                            self.events.push(NestEvent::UnitBuilt {
                                nest,
                                unit,
                                unit_type,
                                paid: false,
                            });
                        }
                        self.events.push(NestEvent::NestSeeded {
                            nest,
                            count: built.len(),
                        });
                    }
                    Err(e) => tracing::warn!(nest = nest.0, "Seeding failed: {e}"),
                }
            }
        }
    }

    /// Center and radius for an attack, or `None` if the unit cannot attack now.
    fn attack_query(&self, attacker: UnitId) -> Result<Option<(Vec2Fixed, Fixed)>> {
        let unit = self
            .units
            .get(attacker)
            .ok_or(GameError::UnknownUnit(attacker.0))?;
        if !unit.is_active() || !unit.unit_type().attack_style().can_attack() {
            return Ok(None);
        }
        Ok(Some((unit.position, unit.attack_radius())))
    }

    fn resolve_attack(&mut self, attacker: UnitId, dmg: i32, hits: &[Collider]) -> Result<Vec<AttackTarget>> {
        let style = self
            .units
            .get(attacker)
            .ok_or(GameError::UnknownUnit(attacker.0))?
            .unit_type()
            .attack_style();
        let targets = select_targets(attacker, style, hits);

        for &target in &targets {
            // Earlier hits in this attack may already have taken the target out.
            let applied = match target {
                AttackTarget::Unit(unit) => {
                    let alive = self
                        .units
                        .get(unit)
                        .is_some_and(|u| u.is_active() && !u.is_dead());
                    if alive {
                        self.damage_unit(unit, dmg)?;
                    }
                    alive
                }
                AttackTarget::Nest(nest) => {
                    let standing = self.nest(nest).is_some_and(NestStructure::is_active);
                    if standing {
                        self.damage_nest(nest, dmg)?;
                    }
                    standing
                }
            };
            if applied {
                self.events.push(NestEvent::DamageDealt {
                    attacker,
                    target,
                    damage: dmg,
                });
            }
        }

        // An area attacker with nothing to hit holds its charge.
        let spent = !targets.is_empty() && style.consumes_attacker();
        if spent && self.units.get(attacker).is_some_and(Unit::is_active) {
            self.retire_unit(attacker)?;
        }
        Ok(targets)
    }

    /// Send a unit that left play back to its nest's pool.
    fn retire_unit(&mut self, id: UnitId) -> Result<()> {
        let owner = self.units.get(id).and_then(|u| u.nest);
        match owner {
            Some(nest) => {
                self.return_unit(nest, id)?;
            }
            None => {
                if let Some(unit) = self.units.get_mut(id) {
                    unit.deactivate();
                }
            }
        }
        Ok(())
    }
}

impl SpatialQuery for World {
    /// Brute-force overlap: active units first, then active nests, each in
    /// creation order. Units and nests are treated as points.
    fn overlap(&self, center: Vec2Fixed, radius: Fixed, mask: Layers) -> Vec<Collider> {
        let mut hits = Vec::new();
        if mask.intersects(Layers::UNITS) {
            hits.extend(
                self.units
                    .active()
                    .filter(|u| center.within(u.position, radius))
                    .map(|u| Collider::Unit(u.id())),
            );
        }
        if mask.intersects(Layers::STRUCTURES) {
            hits.extend(
                self.nests
                    .iter()
                    .filter(|n| n.is_active() && center.within(n.position(), radius))
                    .map(|n| Collider::Nest(n.id())),
            );
        }
        hits
    }
}

const fn attack_mask() -> Layers {
    Layers::UNITS.union(Layers::STRUCTURES)
}

fn index_to_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nest::NestState;
    use crate::spatial::FixedHits;

    fn seeded_world() -> (World, ControllerId, NestId) {
        let mut world = World::new(7);
        let ai = world.add_controller(1000, Color::BLUE);
        let nest = world
            .add_nest(ai, Vec2Fixed::ZERO, &NestData::default())
            .unwrap();
        world.activate_nest(nest).unwrap();
        (world, ai, nest)
    }

    fn run(world: &mut World, ticks: u32) -> Vec<NestEvent> {
        (0..ticks).flat_map(|_| world.tick()).collect()
    }

    #[test]
    fn test_world_new() {
        let world = World::new(0);
        assert_eq!(world.tick_count(), 0);
        assert!(world.units().is_empty());
        assert!(world.nests().is_empty());
    }

    #[test]
    fn test_add_nest_unknown_controller() {
        let mut world = World::new(0);
        assert_eq!(
            world.add_nest(ControllerId(3), Vec2Fixed::ZERO, &NestData::default()),
            Err(GameError::UnknownController(3))
        );
    }

    #[test]
    fn test_seeding_waits_for_settle_delay() {
        let (mut world, ai, nest) = seeded_world();

        let early = run(&mut world, 19);
        assert!(early.is_empty());
        assert!(world.controller(ai).unwrap().units().is_empty());

        let events = world.tick();
        assert_eq!(world.controller(ai).unwrap().units().len(), 6);
        assert_eq!(world.controller(ai).unwrap().resources, 1000);
        assert_eq!(
            events.last(),
            Some(&NestEvent::NestSeeded { nest, count: 6 })
        );
        assert_eq!(world.pending_tasks(), 0);
    }

    #[test]
    fn test_deactivate_before_settle_cancels_seeding() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 5);
        world.deactivate_nest(nest).unwrap();

        run(&mut world, 40);
        assert!(world.controller(ai).unwrap().units().is_empty());
        assert_eq!(world.pending_tasks(), 0);
    }

    #[test]
    fn test_reactivation_seeds_once() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 5);
        world.deactivate_nest(nest).unwrap();
        world.activate_nest(nest).unwrap();

        run(&mut world, 60);
        assert_eq!(world.controller(ai).unwrap().units().len(), 6);
    }

    #[test]
    fn test_unit_death_returns_to_pool() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 20);
        let victim = world.controller(ai).unwrap().units()[0];

        assert!(!world.damage_unit(victim, 10).unwrap());
        assert!(world.damage_unit(victim, 1000).unwrap());

        assert!(!world.unit(victim).unwrap().is_active());
        assert!(!world.controller(ai).unwrap().units().contains(&victim));
        let pool = world.nest(nest).unwrap().pool(UnitType::Harvester).unwrap();
        assert_eq!(pool.in_use_count(), 2);
        assert_eq!(pool.available_count(), 28);
    }

    #[test]
    fn test_destroying_nest_drains_units() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 20);
        world.take_events();

        assert!(world.damage_nest(nest, 1200).unwrap());
        let events = world.take_events();

        assert_eq!(world.nest(nest).unwrap().current_health(), -200);
        assert_eq!(world.nest(nest).unwrap().state(), NestState::Dead);
        assert!(world.controller(ai).unwrap().units().is_empty());
        let returned = events
            .iter()
            .filter(|e| matches!(e, NestEvent::UnitReturned { .. }))
            .count();
        assert_eq!(returned, 6);
        assert_eq!(events.last(), Some(&NestEvent::NestDestroyed { nest }));

        assert!(!world.damage_nest(nest, 100).unwrap());
        assert!(world.take_events().is_empty());
    }

    #[test]
    fn test_warrior_hits_first_enumerated_target_only() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 20);
        let units = world.controller(ai).unwrap().units().to_vec();
        let warrior = units
            .iter()
            .copied()
            .find(|&u| world.unit(u).unwrap().unit_type() == UnitType::Warrior)
            .unwrap();
        let other = units[0];

        let hits = FixedHits(vec![Collider::Unit(other), Collider::Nest(nest)]);
        let targets = world.attack_with(warrior, 15, &hits).unwrap();

        assert_eq!(targets, vec![AttackTarget::Unit(other)]);
        assert_eq!(world.unit(other).unwrap().health(), 45);
        assert_eq!(world.nest(nest).unwrap().current_health(), 1000);
    }

    #[test]
    fn test_harvester_cannot_attack() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 20);
        let harvester = world.controller(ai).unwrap().units()[0];

        let hits = FixedHits(vec![Collider::Nest(nest)]);
        assert!(world.attack_with(harvester, 50, &hits).unwrap().is_empty());
        assert_eq!(world.nest(nest).unwrap().current_health(), 1000);
    }

    #[test]
    fn test_blaster_hits_everything_and_is_consumed() {
        let (mut world, ai, nest) = seeded_world();
        run(&mut world, 20);
        let units = world.controller(ai).unwrap().units().to_vec();
        let blaster = *units.last().unwrap();
        assert_eq!(world.unit(blaster).unwrap().unit_type(), UnitType::Blaster);

        let hits = FixedHits(vec![
            Collider::Unit(units[0]),
            Collider::Unit(blaster),
            Collider::Nest(nest),
        ]);
        let targets = world.attack_with(blaster, 40, &hits).unwrap();

        assert_eq!(
            targets,
            vec![AttackTarget::Unit(units[0]), AttackTarget::Nest(nest)]
        );
        assert_eq!(world.nest(nest).unwrap().current_health(), 960);
        assert!(!world.unit(blaster).unwrap().is_active());
        assert!(!world.controller(ai).unwrap().units().contains(&blaster));
    }

    #[test]
    fn test_blaster_with_nothing_to_hit_is_kept() {
        let (mut world, ai, _) = seeded_world();
        run(&mut world, 20);
        let blaster = *world.controller(ai).unwrap().units().last().unwrap();

        let hits = FixedHits(vec![Collider::Unit(blaster)]);
        assert!(world.attack_with(blaster, 40, &hits).unwrap().is_empty());
        assert!(world.unit(blaster).unwrap().is_active());
        assert!(world.controller(ai).unwrap().units().contains(&blaster));
        assert!(world.take_events().is_empty());
    }

    #[test]
    fn test_no_damage_event_for_retired_target() {
        let (mut world, ai, _) = seeded_world();
        run(&mut world, 20);
        let units = world.controller(ai).unwrap().units().to_vec();
        let warrior = units
            .iter()
            .copied()
            .find(|&u| world.unit(u).unwrap().unit_type() == UnitType::Warrior)
            .unwrap();
        let victim = units[0];
        assert!(world.damage_unit(victim, 1000).unwrap());
        world.take_events();
        let health = world.unit(victim).unwrap().health();

        let hits = FixedHits(vec![Collider::Unit(victim)]);
        let targets = world.attack_with(warrior, 15, &hits).unwrap();

        assert_eq!(targets, vec![AttackTarget::Unit(victim)]);
        assert!(world.take_events().is_empty());
        assert_eq!(world.unit(victim).unwrap().health(), health);
    }

    #[test]
    fn test_builtin_overlap_respects_radius() {
        let (mut world, _ai, nest) = seeded_world();
        run(&mut world, 20);

        // Every seeded unit is within spawn distance (5) of the nest at the origin.
        let near = world.overlap(Vec2Fixed::ZERO, Fixed::from_num(6), attack_mask());
        assert_eq!(near.len(), 7);
        assert_eq!(near.last(), Some(&Collider::Nest(nest)));

        let far = world.overlap(
            Vec2Fixed::from_ints(1000, 1000),
            Fixed::from_num(6),
            attack_mask(),
        );
        assert!(far.is_empty());

        let only_structures = world.overlap(Vec2Fixed::ZERO, Fixed::from_num(6), Layers::STRUCTURES);
        assert_eq!(only_structures, vec![Collider::Nest(nest)]);
    }

    #[test]
    fn test_overlap_ignores_distant_nest() {
        let (mut world, _ai, nest) = seeded_world();
        let rival = world.add_controller(0, Color::RED);
        let far_nest = world
            .add_nest(rival, Vec2Fixed::from_ints(50_000, 0), &NestData::default())
            .unwrap();
        world.activate_nest(far_nest).unwrap();

        let hits = world.overlap(Vec2Fixed::from_ints(-50_000, 0), Fixed::from_num(6), Layers::STRUCTURES);
        assert!(hits.is_empty());

        let hits = world.overlap(Vec2Fixed::ZERO, Fixed::from_num(6), Layers::STRUCTURES);
        assert_eq!(hits, vec![Collider::Nest(nest)]);
    }

    #[test]
    fn test_move_unit_only_moves_active_units() {
        let (mut world, ai, _) = seeded_world();
        run(&mut world, 20);
        let unit = world.controller(ai).unwrap().units()[0];
        let target = Vec2Fixed::from_ints(30, -4);

        assert!(world.move_unit(unit, target).unwrap());
        assert_eq!(world.unit(unit).unwrap().position, target);

        world.damage_unit(unit, 1000).unwrap();
        assert!(!world.move_unit(unit, target).unwrap());
        assert_eq!(world.unit(unit).unwrap().position, Vec2Fixed::ZERO);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let (mut a, _, nest_a) = seeded_world();
        let (mut b, _, nest_b) = seeded_world();
        for _ in 0..40 {
            a.tick();
            b.tick();
            let _ = a.build_unit(nest_a, UnitType::Warrior);
            let _ = b.build_unit(nest_b, UnitType::Warrior);
            assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn test_unknown_handles() {
        let (mut world, _, _) = seeded_world();
        assert_eq!(
            world.build_unit(NestId(9), UnitType::Warrior),
            Err(GameError::UnknownNest(9))
        );
        assert_eq!(world.damage_unit(UnitId(9999), 1), Err(GameError::UnknownUnit(9999)));
    }
}
