//! Actions and timestamps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battlefield::Strike;
use crate::hex::Hex;
use crate::units::UnitId;

/// Milliseconds on the caller's clock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Timestamp from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    /// Milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `millis`.
    #[must_use]
    pub const fn plus_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// What an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Move the acting unit.
    Move,
    /// Attack a hex.
    Attack,
    /// Do nothing.
    Pass,
    /// Recorded when the ply clock ran out.
    TimedOut,
    /// Recorded in place of a buried unit's ply.
    Skipped,
}

impl ActionKind {
    /// Only the battle itself records these.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self, ActionKind::TimedOut | ActionKind::Skipped)
    }

    /// Counts toward the consecutive pass limit.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, ActionKind::Pass | ActionKind::TimedOut)
    }

    /// May not be repeated within one ply.
    #[must_use]
    pub const fn is_once_per_ply(self) -> bool {
        matches!(self, ActionKind::Move | ActionKind::Attack)
    }

    /// Lowercase name used in logs and API views.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Attack => "attack",
            ActionKind::Pass => "pass",
            ActionKind::TimedOut => "timed_out",
            ActionKind::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action as submitted by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Acting unit.
    pub unit: UnitId,
    /// What to do.
    pub kind: ActionKind,
    /// Destination or target hex for moves and attacks.
    pub target: Option<Hex>,
}

impl ActionRequest {
    /// Move `unit` to `dst`.
    #[must_use]
    pub const fn move_to(unit: UnitId, dst: Hex) -> Self {
        Self {
            unit,
            kind: ActionKind::Move,
            target: Some(dst),
        }
    }

    /// Attack `target` with `unit`.
    #[must_use]
    pub const fn attack(unit: UnitId, target: Hex) -> Self {
        Self {
            unit,
            kind: ActionKind::Attack,
            target: Some(target),
        }
    }

    /// Pass with `unit`.
    #[must_use]
    pub const fn pass(unit: UnitId) -> Self {
        Self {
            unit,
            kind: ActionKind::Pass,
            target: None,
        }
    }
}

/// A recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// 1-based sequence number.
    pub num: u64,
    /// Acting unit.
    pub unit: UnitId,
    /// What was done.
    pub kind: ActionKind,
    /// Destination or target hex.
    pub target: Option<Hex>,
    /// When it was recorded.
    pub stamp: Timestamp,
}

/// What `process_action` did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The request was applied as action `num`.
    Applied {
        /// Sequence number given to the action.
        num: u64,
        /// Hits landed by an attack; empty otherwise.
        strikes: Vec<Strike>,
    },
    /// The ply clock had run out. Timed-out actions were recorded and the
    /// request was dropped.
    TimedOut {
        /// Timed-out actions recorded.
        filled: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_kinds() {
        assert!(ActionKind::TimedOut.is_reserved());
        assert!(ActionKind::Skipped.is_reserved());
        assert!(!ActionKind::Pass.is_reserved());
        assert!(ActionKind::TimedOut.is_pass());
        assert!(!ActionKind::Skipped.is_pass());
    }

    #[test]
    fn test_timestamp_math() {
        assert_eq!(Timestamp::from_secs(2).plus_millis(500), Timestamp(2500));
        assert_eq!(Timestamp(u64::MAX).plus_millis(1), Timestamp(u64::MAX));
    }
}
