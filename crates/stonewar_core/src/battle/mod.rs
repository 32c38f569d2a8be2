//! The battle state machine.
//!
//! A battle owns a [`Battlefield`] and the [`ActionQueue`] derived from it.
//! Players submit one action at a time through [`Battle::process_action`];
//! each unit acts twice per ply and every unit gets one ply per turn.
//!
//! # Lifecycle
//!
//! `Setup` (placement) → `Active` (plies) → `GameOver` (terminal). Game over
//! is a status, never an error: once reached, [`Battle::conclude`] releases
//! the units and reports victors, prisoners and spoils.
//!
//! # Time
//!
//! Timeouts are a comparison against the caller's clock, not a scheduled
//! callback. Every call that carries a timestamp first backfills any plies
//! whose deadline has passed.
//!
//! # Example
//!
//! ```
//! use stonewar_core::prelude::*;
//!
//! let mut defenders = Squad::new(1, "Keep", Some(1));
//! defenders
//!     .append(Unit::scient(1, "Warden", Element::Earth, Composition::new(8, 2, 2, 0)).unwrap())
//!     .unwrap();
//! let mut attackers = Squad::new(2, "Raid", Some(2));
//! attackers
//!     .append(Unit::scient(2, "Ember", Element::Fire, Composition::new(2, 8, 0, 2)).unwrap())
//!     .unwrap();
//!
//! let field = Field::new(Element::Earth, Grid::new(4), defenders);
//! let mut battle = Battle::new(field, attackers, BattleConfig::default()).unwrap();
//! battle.place(1, Hex::new(0, -2)).unwrap();
//! battle.place(2, Hex::new(0, 2)).unwrap();
//! battle.start(Timestamp(0)).unwrap();
//!
//! while !battle.is_over() {
//!     let unit = battle.whose_turn().unwrap();
//!     battle.process_action(ActionRequest::pass(unit), Timestamp(1)).unwrap();
//! }
//! assert_eq!(battle.winner(), Some(Side::Defender));
//! ```

mod action;
mod log;
mod state;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use action::{Action, ActionKind, ActionOutcome, ActionRequest, Timestamp};
pub use log::{BattleLog, Message, Snapshot, LOG_VERSION};
pub use state::{BattleState, GameOverCondition};

use crate::action_queue::{opens_ply, ActionQueue};
use crate::battlefield::{Battlefield, BattlefieldError, DamageOutcome, Side, Strike};
use crate::config::BattleConfig;
use crate::element::Element;
use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::hex::Hex;
use crate::squad::{Squad, SquadId};
use crate::stone::Stone;
use crate::units::{Damageable, Unit, UnitId};

/// Errors raised by battle rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The request names a unit whose turn it is not.
    #[error("not the expected unit: expected {expected}, got {got}")]
    UnexpectedUnit {
        /// Unit due to act.
        expected: UnitId,
        /// Unit named in the request.
        got: UnitId,
    },

    /// A ply's second action repeats a move or attack.
    #[error("second action in ply must be different, got {0} twice")]
    RepeatedActionType(ActionKind),

    /// Only the battle records timeouts and skipped plies.
    #[error("{0} actions cannot be submitted")]
    ReservedActionKind(ActionKind),

    /// A move or attack arrived without a target hex.
    #[error("{0} needs a target hex")]
    MissingTarget(ActionKind),

    /// The battle has not started.
    #[error("battle has not started")]
    NotStarted,

    /// The battle is over.
    #[error("battle is over")]
    GameOver,

    /// The battle is still running.
    #[error("battle is not over")]
    NotOver,

    /// The battle already started.
    #[error("battle already started")]
    AlreadyStarted,

    /// A living unit has no location at start.
    #[error("unit {0} is not placed")]
    UnplacedUnit(UnitId),

    /// The unit is not in this battle.
    #[error("unit {0} is not in this battle")]
    UnknownUnit(UnitId),

    /// A squad is over the configured capacity.
    #[error("squad {squad} uses {size} slots, limit is {capacity}")]
    SquadTooLarge {
        /// Squad id.
        squad: SquadId,
        /// Slots used.
        size: u32,
        /// Configured limit.
        capacity: u32,
    },
}

/// Where a battle happens: terrain plus the defending squad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Terrain element; units rich in it act earlier.
    pub element: Element,
    /// Battle grid.
    pub grid: Grid,
    /// Squad holding the field.
    pub defenders: Squad,
}

impl Field {
    /// Field with the given grid.
    #[must_use]
    pub const fn new(element: Element, grid: Grid, defenders: Squad) -> Self {
        Self {
            element,
            grid,
            defenders,
        }
    }

    /// Field with a barren grid sized by `config`.
    #[must_use]
    pub fn barren(element: Element, defenders: Squad, config: &BattleConfig) -> Self {
        Self::new(element, Grid::new(config.grid_radius), defenders)
    }
}

/// Battle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStatus {
    /// Units are being placed.
    Setup,
    /// Plies are being played.
    Active,
    /// Terminal.
    GameOver {
        /// Winning side.
        winner: Side,
        /// Reason.
        condition: GameOverCondition,
    },
}

/// Receives the results of a finished battle.
pub trait BattleEndCallback {
    /// Called once by [`Battle::conclude`].
    ///
    /// The winner's squad holds its survivors. The loser's squad is emptied:
    /// its survivors arrive as `prisoners`. `awards` are the spoils taken
    /// from every buried unit.
    fn battle_end(
        &mut self,
        attacker: Squad,
        defender: Squad,
        winner: Side,
        awards: Vec<Stone>,
        prisoners: Vec<Unit>,
    );
}

/// A battle between a defending and an attacking squad.
#[derive(Debug, Clone)]
pub struct Battle {
    config: BattleConfig,
    field: Battlefield,
    queue: ActionQueue,
    status: BattleStatus,
    state: BattleState,
    log: BattleLog,
}

impl Battle {
    /// Set up a battle on `field` against `attacker`.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid, a squad is over capacity, or a unit
    /// appears in both squads.
    pub fn new(field: Field, attacker: Squad, config: BattleConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(GameError::InvalidState(problems.join("; ")));
        }
        for squad in [&field.defenders, &attacker] {
            if squad.size() > config.squad_capacity {
                return Err(BattleError::SquadTooLarge {
                    squad: squad.id(),
                    size: squad.size(),
                    capacity: config.squad_capacity,
                }
                .into());
            }
        }

        let battlefield = Battlefield::new(field.grid, field.element, field.defenders, attacker)?;
        Ok(Self {
            config,
            field: battlefield,
            queue: ActionQueue::from_entries(Vec::new()),
            status: BattleStatus::Setup,
            state: BattleState::default(),
            log: BattleLog::new(),
        })
    }

    /// Rules in force.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The battlefield.
    #[must_use]
    pub const fn field(&self) -> &Battlefield {
        &self.field
    }

    /// Turn order; empty until the battle starts.
    #[must_use]
    pub const fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// Lifecycle status.
    #[must_use]
    pub const fn status(&self) -> BattleStatus {
        self.status
    }

    /// Game-over counters.
    #[must_use]
    pub const fn state(&self) -> &BattleState {
        &self.state
    }

    /// The record so far.
    #[must_use]
    pub const fn log(&self) -> &BattleLog {
        &self.log
    }

    /// True once the battle has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.status, BattleStatus::GameOver { .. })
    }

    /// Winning side, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        match self.status {
            BattleStatus::GameOver { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Unit due to act next, while the battle is active.
    #[must_use]
    pub fn whose_turn(&self) -> Option<UnitId> {
        if self.status != BattleStatus::Active {
            return None;
        }
        self.queue.get_unit_for_action(self.log.next_num()).ok()
    }

    /// Deadline for the next action, while the battle is active.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        if self.status != BattleStatus::Active {
            return None;
        }
        Some(self.last_stamp().plus_millis(self.config.ply_time_millis()))
    }

    /// Place a unit before the battle starts.
    ///
    /// # Errors
    ///
    /// Fails once the battle has started or if the placement is illegal.
    pub fn place(&mut self, unit: UnitId, hex: Hex) -> Result<()> {
        if self.status != BattleStatus::Setup {
            return Err(BattleError::AlreadyStarted.into());
        }
        self.field.place(unit, hex)?;
        Ok(())
    }

    /// Start the battle at `now`.
    ///
    /// # Errors
    ///
    /// Fails if already started or if a living unit is unplaced.
    pub fn start(&mut self, now: Timestamp) -> Result<()> {
        if self.status != BattleStatus::Setup {
            return Err(BattleError::AlreadyStarted.into());
        }
        if let Some(&unit) = self.field.unplaced().first() {
            return Err(BattleError::UnplacedUnit(unit).into());
        }

        self.queue = ActionQueue::new(&self.field);
        self.state = BattleState::new(self.field.squad_hp(Side::Defender));
        self.log.begin(now, self.field.find_units());
        self.status = BattleStatus::Active;
        tracing::info!(
            units = self.queue.len(),
            defender_hp = self.field.squad_hp(Side::Defender),
            attacker_hp = self.field.squad_hp(Side::Attacker),
            "Battle started"
        );
        self.take_snapshot(0);

        if let Some(condition) = self.death_check() {
            self.finish(0, condition);
        } else {
            self.skip_dead_plies(now);
        }
        Ok(())
    }

    /// Apply one player action at `now`.
    ///
    /// Any plies whose deadline has passed are first filled with timed-out
    /// actions; if that happens the request is dropped and
    /// [`ActionOutcome::TimedOut`] is returned.
    ///
    /// # Errors
    ///
    /// Fails without changing the battle if the request breaks turn rules or
    /// the battlefield rejects it.
    pub fn process_action(&mut self, request: ActionRequest, now: Timestamp) -> Result<ActionOutcome> {
        self.ensure_active()?;

        let filled = self.fill_timeouts(now);
        if filled > 0 {
            return Ok(ActionOutcome::TimedOut { filled });
        }

        if request.kind.is_reserved() {
            return Err(BattleError::ReservedActionKind(request.kind).into());
        }
        if self.field.unit(request.unit).is_none() {
            return Err(BattleError::UnknownUnit(request.unit).into());
        }
        let num = self.log.next_num();
        let expected = self.queue.get_unit_for_action(num)?;
        if request.unit != expected {
            return Err(BattleError::UnexpectedUnit {
                expected,
                got: request.unit,
            }
            .into());
        }
        if !opens_ply(num) && request.kind.is_once_per_ply() {
            if let Some(previous) = self.log.last_action() {
                if previous.kind == request.kind {
                    return Err(BattleError::RepeatedActionType(request.kind).into());
                }
            }
        }

        let strikes = self.dispatch(&request)?;
        self.commit(
            Action {
                num,
                unit: request.unit,
                kind: request.kind,
                target: request.target,
                stamp: now,
            },
            &strikes,
        );
        self.skip_dead_plies(now);
        Ok(ActionOutcome::Applied { num, strikes })
    }

    /// Backfill expired plies without submitting an action.
    ///
    /// Returns the number of timed-out actions recorded.
    ///
    /// # Errors
    ///
    /// Fails if the battle is not active.
    pub fn check_timeouts(&mut self, now: Timestamp) -> Result<u64> {
        self.ensure_active()?;
        Ok(self.fill_timeouts(now))
    }

    /// Deterministic hash of the battle so far.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.log.hash(&mut hasher);
        for unit in self.field.units() {
            unit.id().hash(&mut hasher);
            unit.hp().hash(&mut hasher);
            unit.location().hash(&mut hasher);
        }
        self.state.pass_count.hash(&mut hasher);
        self.state.stagnant_turns.hash(&mut hasher);
        hasher.finish()
    }

    /// Hand the results to `callback` and return the log.
    ///
    /// # Errors
    ///
    /// Fails with [`BattleError::NotOver`] while the battle is running.
    pub fn conclude(self, callback: &mut impl BattleEndCallback) -> Result<BattleLog> {
        let BattleStatus::GameOver { winner, condition } = self.status else {
            return Err(BattleError::NotOver.into());
        };
        let released = self.field.release()?;

        let mut awards = Vec::with_capacity(released.fallen.len());
        for (_, unit) in &released.fallen {
            let mut remains = unit.remains();
            awards.push(remains.extract_award());
        }

        let (mut attacker, mut defender) = (released.attacker, released.defender);
        let loser = match winner {
            Side::Defender => &mut attacker,
            Side::Attacker => &mut defender,
        };
        let ids: Vec<UnitId> = loser
            .units()
            .iter()
            .filter(|u| u.hp() > 0)
            .map(Unit::id)
            .collect();
        let prisoners: Vec<Unit> = ids.into_iter().filter_map(|id| loser.remove(id)).collect();

        tracing::info!(
            winner = winner.name(),
            %condition,
            awards = awards.len(),
            prisoners = prisoners.len(),
            "Battle concluded"
        );
        callback.battle_end(attacker, defender, winner, awards, prisoners);
        Ok(self.log)
    }

    fn ensure_active(&self) -> std::result::Result<(), BattleError> {
        match self.status {
            BattleStatus::Setup => Err(BattleError::NotStarted),
            BattleStatus::GameOver { .. } => Err(BattleError::GameOver),
            BattleStatus::Active => Ok(()),
        }
    }

    fn last_stamp(&self) -> Timestamp {
        self.log
            .last_action()
            .map(|a| a.stamp)
            .or(self.log.started())
            .unwrap_or_default()
    }

    fn dispatch(&mut self, request: &ActionRequest) -> Result<Vec<Strike>> {
        match request.kind {
            ActionKind::Move => {
                let dst = request
                    .target
                    .ok_or(BattleError::MissingTarget(request.kind))?;
                let src = self
                    .field
                    .unit(request.unit)
                    .and_then(Unit::location)
                    .ok_or(BattlefieldError::NotPlaced(request.unit))?;
                self.field.move_unit(request.unit, src, dst)?;
                Ok(Vec::new())
            }
            ActionKind::Attack => {
                let target = request
                    .target
                    .ok_or(BattleError::MissingTarget(request.kind))?;
                Ok(self.field.attack(request.unit, target)?)
            }
            ActionKind::Pass | ActionKind::TimedOut | ActionKind::Skipped => Ok(Vec::new()),
        }
    }

    /// Record an applied action and run the end-of-action checks.
    fn commit(&mut self, action: Action, strikes: &[Strike]) {
        let num = action.num;
        self.log.say(num, narrate(&action));
        for strike in strikes {
            self.log.say(num, narrate_strike(strike));
        }
        self.log.record(action);
        self.state.record(action.kind);
        tracing::debug!(num, unit = action.unit, kind = %action.kind, "Action recorded");

        let turn_over = num % self.config.actions_per_turn == 0;
        if turn_over {
            for (unit, outcome) in self.field.apply_queued() {
                self.log.say(num, narrate_outcome(unit, outcome));
            }
        }
        if let Some(condition) = self.death_check() {
            self.finish(num, condition);
            return;
        }
        if turn_over {
            self.state.end_turn(self.field.squad_hp(Side::Defender));
            self.take_snapshot(num);
        }
        if let Some(condition) = self.state.check_limits(&self.config) {
            self.finish(num, condition);
        }
    }

    /// Record a reserved action for the unit due to act.
    fn commit_reserved(&mut self, kind: ActionKind, stamp: Timestamp) {
        let num = self.log.next_num();
        let Ok(unit) = self.queue.get_unit_for_action(num) else {
            return;
        };
        self.commit(
            Action {
                num,
                unit,
                kind,
                target: None,
                stamp,
            },
            &[],
        );
    }

    /// Fill expired plies with timed-out actions.
    ///
    /// The current ply is closed at its deadline; each further full ply time
    /// that has passed times out one more ply, both actions sharing a stamp.
    fn fill_timeouts(&mut self, now: Timestamp) -> u64 {
        let ply_time = self.config.ply_time_millis();
        let mut stamp = self.last_stamp().plus_millis(ply_time);
        let mut filled = 0;
        while self.status == BattleStatus::Active && now > stamp {
            loop {
                self.commit_reserved(ActionKind::TimedOut, stamp);
                filled += 1;
                if self.status != BattleStatus::Active || opens_ply(self.log.next_num()) {
                    break;
                }
            }
            self.skip_dead_plies(stamp);
            stamp = stamp.plus_millis(ply_time);
        }
        if filled > 0 {
            tracing::warn!(filled, now = %now, "Plies timed out");
        }
        filled
    }

    /// Fill the plies of buried units with skipped actions.
    fn skip_dead_plies(&mut self, stamp: Timestamp) {
        while self.status == BattleStatus::Active {
            let Ok(unit) = self.queue.get_unit_for_action(self.log.next_num()) else {
                return;
            };
            if !self.field.is_buried(unit) {
                return;
            }
            loop {
                self.commit_reserved(ActionKind::Skipped, stamp);
                if self.status != BattleStatus::Active || opens_ply(self.log.next_num()) {
                    break;
                }
            }
        }
    }

    fn death_check(&self) -> Option<GameOverCondition> {
        state::check_deaths(
            self.field.squad_hp(Side::Defender),
            self.field.squad_hp(Side::Attacker),
        )
    }

    fn finish(&mut self, num: u64, condition: GameOverCondition) {
        let winner = condition.winner();
        self.status = BattleStatus::GameOver { winner, condition };
        self.log.say(num, condition.message());
        self.log.finish(winner, condition);
        self.take_snapshot(num);
        tracing::info!(num, winner = winner.name(), %condition, "Battle over");
    }

    fn take_snapshot(&mut self, num: u64) {
        let snapshot = Snapshot {
            num,
            pass_count: self.state.pass_count,
            stagnant_turns: self.state.stagnant_turns,
            hp_count: [
                self.field.squad_hp(Side::Defender),
                self.field.squad_hp(Side::Attacker),
            ],
            whose_turn: self.whose_turn(),
            locations: self.field.find_units(),
            hps: self.field.units().map(|u| (u.id(), u.hp())).collect(),
        };
        self.log.snapshot(snapshot);
    }
}

fn narrate(action: &Action) -> String {
    match (action.kind, action.target) {
        (ActionKind::Move, Some(hex)) => format!("unit {} moved to {hex}", action.unit),
        (ActionKind::Attack, Some(hex)) => format!("unit {} attacked {hex}", action.unit),
        (kind, _) => format!("unit {}: {kind}", action.unit),
    }
}

fn narrate_strike(strike: &Strike) -> String {
    match strike.outcome {
        None => format!(
            "unit {} will take {} over time",
            strike.hit.target, strike.hit.amount
        ),
        Some(outcome) => narrate_outcome(strike.hit.target, outcome),
    }
}

fn narrate_outcome(unit: UnitId, outcome: DamageOutcome) -> String {
    match outcome {
        DamageOutcome::Applied(amount) if amount < 0 => format!("unit {unit} healed {}", -amount),
        DamageOutcome::Applied(amount) => format!("unit {unit} took {amount} damage"),
        DamageOutcome::Dead => format!("unit {unit} died"),
    }
}
