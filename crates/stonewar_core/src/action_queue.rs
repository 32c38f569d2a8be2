//! Turn order.
//!
//! Every unit on the battlefield gets one ply of two consecutive actions per
//! turn. The order is computed once when a battle starts and consulted by
//! index arithmetic afterwards.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battlefield::{Battlefield, Side};
use crate::units::UnitId;

/// Actions each unit takes per ply.
pub const ACTIONS_PER_PLY: u64 = 2;

/// Errors raised by turn-order lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionQueueError {
    /// Action numbers start at 1.
    #[error("invalid action number {0}")]
    InvalidActionNumber(u64),

    /// No units to order.
    #[error("action queue is empty")]
    Empty,
}

/// Sort keys for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// The unit.
    pub unit: UnitId,
    /// Its side.
    pub side: Side,
    /// Total elemental value.
    pub value: u32,
    /// Composition in the field's terrain element.
    pub affinity: u8,
    /// Position within its squad.
    pub slot: usize,
}

impl QueueEntry {
    /// Lower value first, then higher affinity, then earlier slot, then
    /// attacker before defender.
    fn order(&self, other: &Self) -> Ordering {
        let attacker_first = |side: Side| side != Side::Attacker;
        (self.value, Reverse(self.affinity), self.slot, attacker_first(self.side)).cmp(&(
            other.value,
            Reverse(other.affinity),
            other.slot,
            attacker_first(other.side),
        ))
    }
}

/// Deterministic unit order for a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionQueue {
    entries: Vec<QueueEntry>,
}

impl ActionQueue {
    /// Order every unit on the battlefield, living or not.
    #[must_use]
    pub fn new(field: &Battlefield) -> Self {
        let terrain = field.element();
        let mut entries = Vec::new();
        for side in Side::BOTH {
            for (slot, unit) in field.members(side).enumerate() {
                entries.push(QueueEntry {
                    unit: unit.id(),
                    side,
                    value: unit.comp().value(),
                    affinity: unit.comp().get(terrain),
                    slot,
                });
            }
        }
        Self::from_entries(entries)
    }

    /// Order pre-computed entries.
    #[must_use]
    pub fn from_entries(mut entries: Vec<QueueEntry>) -> Self {
        entries.sort_by(QueueEntry::order);
        tracing::debug!(
            order = ?entries.iter().map(|e| e.unit).collect::<Vec<_>>(),
            "Built action queue"
        );
        Self { entries }
    }

    /// Sorted entries.
    #[must_use]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Unit ids in acting order.
    pub fn order(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.entries.iter().map(|e| e.unit)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Actions in one full turn.
    #[must_use]
    pub fn actions_per_turn(&self) -> u64 {
        self.len() as u64 * ACTIONS_PER_PLY
    }

    /// Queue position acting on the 1-based action `num`.
    pub fn index_for_action(&self, num: u64) -> Result<usize, ActionQueueError> {
        if num < 1 {
            return Err(ActionQueueError::InvalidActionNumber(num));
        }
        if self.is_empty() {
            return Err(ActionQueueError::Empty);
        }
        let ply = (num - 1) / ACTIONS_PER_PLY;
        Ok((ply % self.len() as u64) as usize)
    }

    /// Unit acting on the 1-based action `num`.
    pub fn get_unit_for_action(&self, num: u64) -> Result<UnitId, ActionQueueError> {
        let index = self.index_for_action(num)?;
        Ok(self.entries[index].unit)
    }
}

/// True when `num` is the first action of its ply.
#[must_use]
pub const fn opens_ply(num: u64) -> bool {
    num % ACTIONS_PER_PLY == 1
}
