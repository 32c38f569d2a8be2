//! Error types for the simulation core.
//!
//! Each module owns a focused error enum; [`GameError`] aggregates them so
//! callers that drive several subsystems can use a single `?` chain.

use thiserror::Error;

use crate::action_queue::ActionQueueError;
use crate::battle::BattleError;
use crate::battlefield::BattlefieldError;
use crate::composition::CompositionError;
use crate::squad::SquadError;
use crate::stone::StoneError;
use crate::transmuter::TransmuteError;
use crate::units::UnitError;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Composition construction or arithmetic left the `[0, 255]` range.
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// Stone arithmetic failed.
    #[error(transparent)]
    Stone(#[from] StoneError),

    /// Unit or weapon construction failed.
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Squad membership change failed.
    #[error(transparent)]
    Squad(#[from] SquadError),

    /// Placement, movement or attack on the battlefield failed.
    #[error(transparent)]
    Battlefield(#[from] BattlefieldError),

    /// Turn order lookup failed.
    #[error(transparent)]
    ActionQueue(#[from] ActionQueueError),

    /// Transmutation could not be satisfied.
    #[error(transparent)]
    Transmute(#[from] TransmuteError),

    /// Battle rule violation.
    #[error(transparent)]
    Battle(#[from] BattleError),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid simulation state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
