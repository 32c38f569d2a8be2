//! Game-over tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use crate::battlefield::Side;
use crate::config::BattleConfig;

/// Why a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCondition {
    /// Every defender is dead.
    DefenderDead,
    /// Every attacker is dead.
    AttackerDead,
    /// The defender lost no hp for too many turns.
    Stagnation,
    /// Too many consecutive passes or timeouts.
    BothPassed,
}

impl GameOverCondition {
    /// The side this condition hands the win to.
    #[must_use]
    pub const fn winner(self) -> Side {
        match self {
            GameOverCondition::DefenderDead => Side::Attacker,
            GameOverCondition::AttackerDead
            | GameOverCondition::Stagnation
            | GameOverCondition::BothPassed => Side::Defender,
        }
    }

    /// Message recorded in the log.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            GameOverCondition::DefenderDead => "Defender's squad is dead",
            GameOverCondition::AttackerDead => "Attacker's squad is dead",
            GameOverCondition::Stagnation => "Attacker failed to deal sufficient damage",
            GameOverCondition::BothPassed => "Both sides passed",
        }
    }
}

impl fmt::Display for GameOverCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Counters behind the end-of-battle checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleState {
    /// Consecutive passed or timed-out actions.
    pub pass_count: u32,
    /// Consecutive turns in which the defender lost no hp.
    pub stagnant_turns: u32,
    /// Defender hp at the last turn boundary.
    pub last_turn_hp: i32,
}

impl BattleState {
    /// Fresh counters for a defender starting at `defender_hp`.
    #[must_use]
    pub const fn new(defender_hp: i32) -> Self {
        Self {
            pass_count: 0,
            stagnant_turns: 0,
            last_turn_hp: defender_hp,
        }
    }

    /// Update the pass streak for an action of `kind`.
    ///
    /// Skipped plies neither extend nor break the streak.
    pub fn record(&mut self, kind: ActionKind) {
        if kind.is_pass() {
            self.pass_count += 1;
        } else if kind != ActionKind::Skipped {
            self.pass_count = 0;
        }
    }

    /// Close a turn with the defender at `defender_hp`.
    pub fn end_turn(&mut self, defender_hp: i32) {
        if defender_hp < self.last_turn_hp {
            self.stagnant_turns = 0;
        } else {
            self.stagnant_turns += 1;
        }
        self.last_turn_hp = defender_hp;
    }

    /// Which limit, if any, has been reached.
    #[must_use]
    pub fn check_limits(&self, config: &BattleConfig) -> Option<GameOverCondition> {
        if self.stagnant_turns >= config.stagnant_turn_limit {
            Some(GameOverCondition::Stagnation)
        } else if self.pass_count >= config.pass_limit {
            Some(GameOverCondition::BothPassed)
        } else {
            None
        }
    }
}

/// Death checks, run after every action.
#[must_use]
pub fn check_deaths(defender_hp: i32, attacker_hp: i32) -> Option<GameOverCondition> {
    if defender_hp <= 0 {
        Some(GameOverCondition::DefenderDead)
    } else if attacker_hp <= 0 {
        Some(GameOverCondition::AttackerDead)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_accumulate_and_reset() {
        let mut state = BattleState::new(100);
        for _ in 0..3 {
            state.record(ActionKind::Pass);
        }
        state.record(ActionKind::Skipped);
        state.record(ActionKind::TimedOut);
        assert_eq!(state.pass_count, 4);
        state.record(ActionKind::Move);
        assert_eq!(state.pass_count, 0);
    }

    #[test]
    fn test_stagnation_counts_consecutive_turns() {
        let mut state = BattleState::new(100);
        state.end_turn(100);
        state.end_turn(100);
        assert_eq!(state.stagnant_turns, 2);
        state.end_turn(90);
        assert_eq!(state.stagnant_turns, 0);
        // healing counts as stagnant
        state.end_turn(95);
        assert_eq!(state.stagnant_turns, 1);
    }

    #[test]
    fn test_limits() {
        let config = BattleConfig::default();
        let mut state = BattleState::new(10);
        assert_eq!(state.check_limits(&config), None);
        state.pass_count = 8;
        assert_eq!(state.check_limits(&config), Some(GameOverCondition::BothPassed));
        state.stagnant_turns = 4;
        assert_eq!(state.check_limits(&config), Some(GameOverCondition::Stagnation));
    }

    #[test]
    fn test_deaths_checked_defender_first() {
        assert_eq!(check_deaths(0, 0), Some(GameOverCondition::DefenderDead));
        assert_eq!(check_deaths(5, 0), Some(GameOverCondition::AttackerDead));
        assert_eq!(check_deaths(5, 5), None);
        assert_eq!(GameOverCondition::BothPassed.winner(), Side::Defender);
    }
}
