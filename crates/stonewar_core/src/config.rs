//! Battle rules loaded from RON.
//!
//! **Note:** This module contains no IO. Callers read the file and hand the
//! text to [`BattleConfig::from_ron_str`].

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Tunable battle rules.
///
/// # Example RON
///
/// ```ron
/// BattleConfig(
///     ply_time_secs: 120,
///     actions_per_turn: 4,
///     pass_limit: 8,
///     stagnant_turn_limit: 4,
///     grid_radius: 16,
///     squad_capacity: 8,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seconds a unit has to finish its ply before it times out.
    pub ply_time_secs: u64,

    /// Actions between end-of-turn checks (damage over time, stagnation).
    pub actions_per_turn: u64,

    /// Consecutive passed or timed-out actions that end the battle.
    pub pass_limit: u32,

    /// Consecutive turns without defender losses that end the battle.
    pub stagnant_turn_limit: u32,

    /// Radius of a freshly generated battle grid.
    pub grid_radius: u32,

    /// Slot capacity of each squad.
    pub squad_capacity: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            ply_time_secs: 120,
            actions_per_turn: 4,
            pass_limit: 8,
            stagnant_turn_limit: 4,
            grid_radius: 16,
            squad_capacity: 8,
        }
    }
}

impl BattleConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text is not valid RON for
    /// this struct.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<battle config>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize config: {e}")))
    }

    /// Ply time in milliseconds, saturating for absurdly long plies.
    #[must_use]
    pub const fn ply_time_millis(&self) -> u64 {
        self.ply_time_secs.saturating_mul(1000)
    }

    /// Check the rules are usable.
    ///
    /// Returns a list of problems; empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.ply_time_secs == 0 {
            errors.push("ply_time_secs must be positive".to_string());
        }
        if self.actions_per_turn == 0 || self.actions_per_turn % 2 != 0 {
            errors.push(format!(
                "actions_per_turn must be a positive multiple of 2, got {}",
                self.actions_per_turn
            ));
        }
        if self.pass_limit == 0 {
            errors.push("pass_limit must be positive".to_string());
        }
        if self.stagnant_turn_limit == 0 {
            errors.push("stagnant_turn_limit must be positive".to_string());
        }
        if self.grid_radius == 0 {
            errors.push("grid_radius must be positive".to_string());
        }
        if self.squad_capacity == 0 {
            errors.push("squad_capacity must be positive".to_string());
        }
        errors
    }
}
