//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A stored battle log must replay to the same outcome, and two servers fed
//! the same actions must agree. Sources of non-determinism include:
//!
//! - **Floating-point math**: damage scaling uses [`stonewar_core::math`]
//!   fixed-point helpers throughout.
//!
//! - **`HashMap` iteration order**: the core keeps units in `BTreeMap`s and
//!   iterates in id order.
//!
//! - **Wall-clock time**: the battle never reads a clock; every timestamp is
//!   supplied by the caller.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (damage, queue order, timeouts)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full scripted battles are reproducible
//! 4. **Parallel tests**: running N battles in parallel all match

use std::thread;

use stonewar_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of steps each battle ran.
    pub steps: u64,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Steps: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use stonewar_test_utils::determinism::{greedy_step, verify_determinism};
/// use stonewar_test_utils::fixtures;
///
/// let result = verify_determinism(
///     3,
///     40,
///     fixtures::duel,
///     greedy_step,
///     |battle| battle.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
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

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Take one action for whoever is due, picking greedily.
///
/// Tries to attack each enemy in id order, then to close distance to the
/// nearest enemy, then passes. Each action is stamped one second after the
/// previous one, so no ply ever times out. Does nothing once the battle is
/// over.
pub fn greedy_step(battle: &mut Battle) {
    let Some(unit) = battle.whose_turn() else {
        return;
    };
    let now = battle
        .log()
        .last_action()
        .map_or(Timestamp(0), |a| a.stamp)
        .plus_millis(1_000);
    for request in greedy_requests(battle, unit) {
        if battle.process_action(request, now).is_ok() {
            return;
        }
    }
}

fn greedy_requests(battle: &Battle, unit: UnitId) -> Vec<ActionRequest> {
    let field = battle.field();
    let mut requests = Vec::new();
    let (Some(side), Some(at)) = (
        field.side_of(unit),
        field.unit(unit).and_then(Unit::location),
    ) else {
        requests.push(ActionRequest::pass(unit));
        return requests;
    };

    let enemies: Vec<Hex> = field
        .members(side.other())
        .filter_map(Unit::location)
        .collect();
    requests.extend(enemies.iter().map(|&hex| ActionRequest::attack(unit, hex)));

    let closest = |hex: Hex| enemies.iter().map(|e| e.distance(hex)).min().unwrap_or(u32::MAX);
    let reach = field.unit(unit).map_or(0, Unit::move_range);
    let step_to = field
        .grid()
        .range(at, reach)
        .into_iter()
        .filter(|&hex| hex != at && field.grid().tile(hex).is_some_and(Tile::is_empty))
        .min_by_key(|&hex| (closest(hex), hex));
    if let Some(dst) = step_to.filter(|&dst| closest(dst) < closest(at)) {
        requests.push(ActionRequest::move_to(unit, dst));
    }

    requests.push(ActionRequest::pass(unit));
    requests
}

/// Drive a battle greedily until it ends or `max_steps` run out.
///
/// Returns the number of steps taken.
pub fn play_out(battle: &mut Battle, max_steps: u64) -> u64 {
    let mut steps = 0;
    while steps < max_steps && !battle.is_over() {
        greedy_step(battle);
        steps += 1;
    }
    tracing::debug!(steps, over = battle.is_over(), "Played out battle");
    steps
}

/// Run a greedy battle twice and compare final state hashes.
pub fn verify_battle_determinism<F>(setup_fn: F, steps: u64) -> bool
where
    F: Fn() -> Battle,
{
    verify_determinism(2, steps, &setup_fn, greedy_step, Battle::state_hash).is_deterministic
}

/// Run N greedy battles on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a battle thread panics.
pub fn run_parallel_battles_scoped<F>(setup_fn: F, num_battles: usize, steps: u64) -> ParallelBattleResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..steps {
                        greedy_step(&mut battle);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    ParallelBattleResult {
        hashes,
        steps,
        num_battles,
    }
}

/// Compare two greedy runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(step)` at the first step where
/// their hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, steps: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        greedy_step(&mut first);
        greedy_step(&mut second);

        if first.state_hash() != second.state_hash() {
            return Some(step);
        }
    }

    None
}

/// Verify that a played-out battle's log survives a storage round trip.
pub fn verify_log_roundtrip<F>(setup_fn: F, steps: u64) -> bool
where
    F: Fn() -> Battle,
{
    let mut battle = setup_fn();
    play_out(&mut battle, steps);
    let log = battle.log();

    let Ok(bytes) = log.encode() else {
        return false;
    };
    let Ok(restored) = stonewar_core::battle::BattleLog::decode(&bytes) else {
        return false;
    };

    restored.hash_value() == log.hash_value() && &restored == log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_verify_determinism_detects_divergence() {
        use std::cell::Cell;

        let counter = Cell::new(0u64);
        let result = verify_determinism(
            3,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |s| *s,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    fn test_duel_is_deterministic() {
        let result = verify_determinism(3, 60, fixtures::duel, greedy_step, Battle::state_hash);
        result.assert_deterministic();
    }

    #[test]
    fn test_greedy_duel_ends() {
        let mut battle = fixtures::duel();
        play_out(&mut battle, 500);
        assert!(battle.is_over());
    }

    #[test]
    fn test_greedy_closes_then_strikes() {
        let mut battle = fixtures::duel();
        greedy_step(&mut battle);
        greedy_step(&mut battle);
        let kinds: Vec<ActionKind> = battle.log().actions().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Move, ActionKind::Attack]);
    }

    #[test]
    fn test_skirmish_matches_step_by_step() {
        assert_eq!(find_first_divergence(fixtures::skirmish, 80), None);
        assert!(verify_battle_determinism(fixtures::skirmish, 80));
    }

    #[test]
    fn test_parallel_skirmishes() {
        let result = run_parallel_battles_scoped(fixtures::skirmish, 4, 80);
        result.assert_deterministic();
    }

    #[test]
    fn test_log_roundtrip() {
        assert!(verify_log_roundtrip(fixtures::skirmish, 200));
    }
}
