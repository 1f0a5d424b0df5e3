//! Headless match runner.
//!
//! Drives a [`World`] built from a [`Scenario`] with a simple AI policy:
//!
//! - every tick each side requests the next unit in its build order (the
//!   nest's cooldown and the side's stockpile decide whether it happens)
//! - once per second every active harvester earns its side `harvest_rate`
//! - combatants march straight at the nearest enemy nest and attack once
//!   per second, ignoring friendly colliders

use nest_core::components::{ControllerId, UnitId};
use nest_core::math::{fixed_sqrt, Fixed, Vec2Fixed};
use nest_core::nest::NestState;
use nest_core::simulation::{NestEvent, World, TICK_RATE};
use nest_core::spatial::{Collider, FixedHits, Layers, SpatialQuery};
use nest_core::unit_kind::UnitType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::scenario::{Scenario, ScenarioError, Side};

/// Per-side counters accumulated from world events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    /// Paid builds.
    pub built: u32,
    /// Free starting units.
    pub seeded: u32,
    /// Units returned to this side's pools.
    pub returned: u32,
    /// Damage this side's units dealt.
    pub damage_dealt: i64,
}

/// A running match.
#[derive(Debug, Clone)]
pub struct Match {
    world: World,
    sides: Vec<Side>,
    tallies: Vec<SideTally>,
    next_build: Vec<usize>,
    harvest_rate: i32,
    march_speed: Fixed,
}

impl Match {
    /// Build the world for `scenario` with the given seed.
    pub fn new(scenario: &Scenario, seed: u64) -> Result<Self, ScenarioError> {
        let (world, sides) = scenario.build_world(seed)?;
        let count = sides.len();
        Ok(Self {
            world,
            sides,
            tallies: vec![SideTally::default(); count],
            next_build: vec![0; count],
            harvest_rate: scenario.harvest_rate,
            march_speed: Fixed::from_num(scenario.march_speed),
        })
    }

    /// The simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Sides in scenario order.
    #[must_use]
    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Number of sides whose nest is still standing.
    #[must_use]
    pub fn sides_standing(&self) -> usize {
        self.sides
            .iter()
            .filter(|s| self.world.nest(s.nest).is_some_and(|n| n.is_active()))
            .count()
    }

    /// World state hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.world.state_hash()
    }

    /// Advance one tick and let every side act.
    pub fn step(&mut self) {
        let events = self.world.tick();
        self.tally(events);

        let tick = self.world.tick_count();
        self.request_builds();
        if tick % u64::from(TICK_RATE) == 0 {
            self.harvest();
        }
        self.march();
        if tick % u64::from(TICK_RATE) == 0 {
            self.attack();
        }

        let events = self.world.take_events();
        self.tally(events);
    }

    /// Summarize the match so far.
    #[must_use]
    pub fn summary(&self, scenario: &str, seed: u64) -> RunSummary {
        let sides = self
            .sides
            .iter()
            .zip(&self.tallies)
            .map(|(side, tally)| {
                let nest = self.world.nest(side.nest);
                let controller = self.world.controller(side.controller);
                let units = controller.map(|c| c.units()).unwrap_or_default();
                let count = |unit_type: UnitType| {
                    units
                        .iter()
                        .filter(|&&id| {
                            self.world
                                .unit(id)
                                .is_some_and(|u| u.unit_type() == unit_type)
                        })
                        .count()
                };
                SideSummary {
                    name: side.name.clone(),
                    nest_state: nest.map_or(NestState::Inactive, |n| n.state()),
                    nest_health: nest.map_or(0, |n| n.current_health()),
                    resources: controller.map_or(0, |c| c.resources),
                    harvesters: count(UnitType::Harvester),
                    warriors: count(UnitType::Warrior),
                    blasters: count(UnitType::Blaster),
                    tally: *tally,
                }
            })
            .collect();

        RunSummary {
            scenario: scenario.to_string(),
            seed,
            ticks: self.world.tick_count(),
            state_hash: format!("{:016x}", self.world.state_hash()),
            sides,
        }
    }

    fn side_of_controller(&self, controller: ControllerId) -> Option<usize> {
        self.sides.iter().position(|s| s.controller == controller)
    }

    fn owner_of(&self, collider: Collider) -> Option<ControllerId> {
        let nest = match collider {
            Collider::Unit(id) => self.world.unit(id)?.nest?,
            Collider::Nest(id) => id,
            Collider::Obstacle => return None,
        };
        Some(self.world.nest(nest)?.controller())
    }

    fn owner_of_unit(&self, unit: UnitId) -> Option<ControllerId> {
        self.owner_of(Collider::Unit(unit))
    }

    fn tally(&mut self, events: Vec<NestEvent>) {
        for event in events {
            let nest = match event {
                NestEvent::UnitBuilt { nest, .. } | NestEvent::UnitReturned { nest, .. } => nest,
                NestEvent::NestDestroyed { nest } => {
                    info!(nest = nest.0, tick = self.world.tick_count(), "Nest destroyed");
                    continue;
                }
                // Damage is counted where the attack is issued; a consumed
                // attacker has no nest left to attribute it to.
                NestEvent::DamageDealt { .. } | NestEvent::NestSeeded { .. } => continue,
            };
            let owner = self.world.nest(nest).map(|n| n.controller());
            let Some(index) = owner.and_then(|c| self.side_of_controller(c)) else {
                continue;
            };
            let tally = &mut self.tallies[index];
            match event {
                NestEvent::UnitBuilt { paid: true, .. } => tally.built += 1,
                NestEvent::UnitBuilt { paid: false, .. } => tally.seeded += 1,
                _ => tally.returned += 1,
            }
        }
    }

    fn request_builds(&mut self) {
        for index in 0..self.sides.len() {
            let side = &self.sides[index];
            if side.build_order.is_empty() {
                continue;
            }
            let unit_type = side.build_order[self.next_build[index] % side.build_order.len()];
            if let Ok(outcome) = self.world.build_unit(side.nest, unit_type) {
                if outcome.unit().is_some() {
                    self.next_build[index] += 1;
                }
            }
        }
    }

    fn harvest(&mut self) {
        for side in &self.sides {
            let harvesters = self.world.controller(side.controller).map_or(0, |c| {
                c.units()
                    .iter()
                    .filter(|&&id| {
                        self.world
                            .unit(id)
                            .is_some_and(|u| u.unit_type() == UnitType::Harvester)
                    })
                    .count()
            });
            let income = i32::try_from(harvesters)
                .unwrap_or(i32::MAX)
                .saturating_mul(self.harvest_rate);
            if let Some(controller) = self.world.controller_mut(side.controller) {
                controller.deposit(income);
            }
        }
    }

    /// Nearest active enemy nest to `from`.
    fn enemy_nest_near(&self, from: Vec2Fixed, owner: ControllerId) -> Option<Vec2Fixed> {
        self.world
            .nests()
            .iter()
            .filter(|n| n.is_active() && n.controller() != owner)
            .map(|n| n.position())
            .min_by_key(|&p| from.distance_squared(p))
    }

    fn march(&mut self) {
        let orders: Vec<(UnitId, Vec2Fixed)> = self
            .world
            .units()
            .active()
            .filter(|u| u.unit_type().attack_style().can_attack())
            .filter_map(|u| {
                let owner = self.owner_of_unit(u.id())?;
                let target = self.enemy_nest_near(u.position, owner)?;
                let offset = target - u.position;
                let distance = fixed_sqrt(offset.distance_squared(Vec2Fixed::ZERO));
                // Close to half range so fixed-point rounding cannot strand
                // a unit just outside it.
                let halt = u.attack_radius() / Fixed::from_num(2);
                if distance <= halt {
                    return None;
                }
                let step = self.march_speed.min(distance - halt);
                Some((u.id(), u.position + offset.scale(step / distance)))
            })
            .collect();

        for (id, position) in orders {
            if let Err(e) = self.world.move_unit(id, position) {
                debug!(unit = id.0, "Move failed: {e}");
            }
        }
    }

    fn attack(&mut self) {
        let attackers: Vec<(UnitId, i32)> = self
            .world
            .units()
            .active()
            .filter(|u| u.unit_type().attack_style().can_attack())
            .map(|u| (u.id(), u.attack_damage()))
            .collect();

        for (attacker, damage) in attackers {
            let Some(unit) = self.world.unit(attacker) else {
                continue;
            };
            // Earlier attacks this tick may have taken it out of play.
            if !unit.is_active() {
                continue;
            }
            let Some(owner) = self.owner_of_unit(attacker) else {
                continue;
            };
            let hits: Vec<Collider> = self
                .world
                .overlap(
                    unit.position,
                    unit.attack_radius(),
                    Layers::UNITS | Layers::STRUCTURES,
                )
                .into_iter()
                .filter(|&c| self.owner_of(c).is_some_and(|o| o != owner))
                .collect();
            if hits.is_empty() {
                continue;
            }
            match self.world.attack_with(attacker, damage, &FixedHits(hits)) {
                Ok(targets) => {
                    if let Some(index) = self.side_of_controller(owner) {
                        let landed = i64::try_from(targets.len()).unwrap_or(i64::MAX);
                        self.tallies[index].damage_dealt += landed * i64::from(damage);
                    }
                }
                Err(e) => debug!(unit = attacker.0, "Attack failed: {e}"),
            }
        }
    }
}

/// Final state of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Side name.
    pub name: String,
    /// Nest lifecycle state.
    pub nest_state: NestState,
    /// Nest health.
    pub nest_health: i32,
    /// Stockpile.
    pub resources: i32,
    /// Harvesters in play.
    pub harvesters: usize,
    /// Warriors in play.
    pub warriors: usize,
    /// Blasters in play.
    pub blasters: usize,
    /// Event counters.
    pub tally: SideTally,
}

/// JSON summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// RNG seed.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Final world hash, hex.
    pub state_hash: String,
    /// Per-side results.
    pub sides: Vec<SideSummary>,
}

/// Run `scenario` for `ticks` ticks, stopping early once at most one nest stands.
pub fn run_match(
    scenario: &Scenario,
    seed: u64,
    ticks: u64,
) -> Result<RunSummary, ScenarioError> {
    let mut game = Match::new(scenario, seed)?;
    let settle = u64::from(
        scenario
            .sides
            .iter()
            .map(|s| s.nest.config.settle_delay_ticks)
            .max()
            .unwrap_or(0),
    );

    for _ in 0..ticks {
        game.step();
        let decided = scenario.sides.len() > 1 && game.sides_standing() <= 1;
        if decided && game.world().tick_count() > settle {
            info!(tick = game.world().tick_count(), "Match decided");
            break;
        }
    }

    Ok(game.summary(&scenario.name, seed))
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Seed used for every run.
    pub seed: u64,
    /// Ticks per run.
    pub ticks: u64,
    /// Final hash per run.
    pub hashes: Vec<String>,
    /// Whether every run agreed.
    pub deterministic: bool,
}

/// Run the same match `runs` times in parallel and compare final hashes.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    ticks: u64,
    runs: u32,
) -> Result<VerifyReport, ScenarioError> {
    let summaries: Vec<RunSummary> = (0..runs)
        .into_par_iter()
        .map(|_| run_match(scenario, seed, ticks))
        .collect::<Result<_, _>>()?;

    let hashes: Vec<String> = summaries.into_iter().map(|s| s.state_hash).collect();
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !deterministic {
        debug!(?hashes, "Runs diverged");
    }

    Ok(VerifyReport {
        seed,
        ticks,
        hashes,
        deterministic,
    })
}
