//! Append-only battle record.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::action::{Action, Timestamp};
use super::state::GameOverCondition;
use crate::battlefield::Side;
use crate::error::{GameError, Result};
use crate::hex::Hex;
use crate::units::UnitId;

/// Log format version for compatibility.
pub const LOG_VERSION: u32 = 1;

/// A line of narration tied to an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Action the message belongs to; 0 before the first action.
    pub num: u64,
    /// Text.
    pub text: String,
}

/// Battle state at a turn boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Last action number included.
    pub num: u64,
    /// Consecutive passed or timed-out actions.
    pub pass_count: u32,
    /// Consecutive turns without defender losses.
    pub stagnant_turns: u32,
    /// Total hp, defender then attacker.
    pub hp_count: [i32; 2],
    /// Unit due to act next.
    pub whose_turn: Option<UnitId>,
    /// Locations of living placed units.
    pub locations: BTreeMap<UnitId, Hex>,
    /// Hit points of every unit.
    pub hps: BTreeMap<UnitId, i32>,
}

/// Everything that happened in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BattleLog {
    version: u32,
    started: Option<Timestamp>,
    initial_locations: BTreeMap<UnitId, Hex>,
    actions: Vec<Action>,
    messages: Vec<Message>,
    snapshots: Vec<Snapshot>,
    outcome: Option<(Side, GameOverCondition)>,
}

impl BattleLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: LOG_VERSION,
            ..Self::default()
        }
    }

    pub(crate) fn begin(&mut self, now: Timestamp, locations: BTreeMap<UnitId, Hex>) {
        self.started = Some(now);
        self.initial_locations = locations;
    }

    pub(crate) fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub(crate) fn say(&mut self, num: u64, text: impl Into<String>) {
        self.messages.push(Message {
            num,
            text: text.into(),
        });
    }

    pub(crate) fn snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub(crate) fn finish(&mut self, winner: Side, condition: GameOverCondition) {
        self.outcome = Some((winner, condition));
    }

    /// When the battle started.
    #[must_use]
    pub const fn started(&self) -> Option<Timestamp> {
        self.started
    }

    /// Unit locations when the battle started.
    #[must_use]
    pub const fn initial_locations(&self) -> &BTreeMap<UnitId, Hex> {
        &self.initial_locations
    }

    /// Recorded actions in order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Most recent action.
    #[must_use]
    pub fn last_action(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// Number the next action will get.
    #[must_use]
    pub fn next_num(&self) -> u64 {
        self.actions.len() as u64 + 1
    }

    /// Narration in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Turn-boundary snapshots in order.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Winner and reason, once the battle is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<(Side, GameOverCondition)> {
        self.outcome
    }

    /// Deterministic hash of the whole log.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize battle log: {e}")))
    }

    /// Restore a stored log.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a log of this version.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let log: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize battle log: {e}")))?;
        if log.version != LOG_VERSION {
            return Err(GameError::InvalidState(format!(
                "Battle log version mismatch: expected {LOG_VERSION}, got {}",
                log.version
            )));
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::action::ActionKind;

    fn sample() -> BattleLog {
        let mut log = BattleLog::new();
        log.begin(Timestamp(0), BTreeMap::from([(1, Hex::ORIGIN)]));
        log.record(Action {
            num: 1,
            unit: 1,
            kind: ActionKind::Pass,
            target: None,
            stamp: Timestamp(10),
        });
        log.say(1, "unit 1 passed");
        log
    }

    #[test]
    fn test_encode_roundtrip() {
        let log = sample();
        let bytes = log.encode().unwrap();
        assert_eq!(BattleLog::decode(&bytes).unwrap(), log);
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.hash_value(), b.hash_value());
        b.say(1, "extra");
        assert_ne!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn test_next_num() {
        assert_eq!(BattleLog::new().next_num(), 1);
        assert_eq!(sample().next_num(), 2);
    }
}
