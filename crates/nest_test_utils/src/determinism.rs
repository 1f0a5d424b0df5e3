//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a world produces identical
//! results given identical seeds and inputs.
//!
//! # Sources of non-determinism guarded against
//!
//! - **Floating-point math**: positions and radii are fixed-point.
//! - **HashMap iteration order**: registries iterate in creation order and
//!   pools are only ever looked up by key.
//! - **System randomness**: spawn offsets come from the world's seeded RNG.

use std::thread;

use nest_core::simulation::World;
use nest_core::unit_kind::UnitType;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Distinct final hashes; exactly one when the runs agreed.
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Panic with every run's hash unless the runs agreed.
    ///
    /// # Panics
    ///
    /// Panics if any two runs ended on different hashes.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "{} runs of {} ticks ended on {} distinct hashes: {:x?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// One tick of a busy scripted match: every nest tries to build a unit
/// chosen by the tick number, then every active combatant attacks.
pub fn scripted_step(world: &mut World) {
    world.tick();

    let choice = UnitType::BUILDABLE[usize::try_from(world.tick_count() % 3).unwrap_or(0)];
    let nests: Vec<_> = world.nests().iter().map(|n| n.id()).collect();
    for nest in nests {
        let _ = world.build_unit(nest, choice);
    }

    let attackers: Vec<_> = world
        .units()
        .active()
        .filter(|u| u.unit_type().attack_style().can_attack())
        .map(|u| (u.id(), u.attack_damage()))
        .collect();
    for (unit, damage) in attackers {
        let _ = world.attack(unit, damage);
    }
}

/// Run `num_sims` worlds on scoped threads with [`scripted_step`] and
/// compare their final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_worlds_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
) -> DeterminismResult
where
    F: Fn() -> World + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut world = setup_fn();
                    for _ in 0..num_ticks {
                        scripted_step(&mut world);
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs never differ, `Some(tick)` at the first tick whose
/// hashes disagree.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> World,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    for tick in 0..num_ticks {
        scripted_step(&mut a);
        scripted_step(&mut b);
        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }
    None
}
