//! # Stonewar Development Tools
//!
//! Command-line tools for development:
//! - Battle config validation
//! - Transmutation planning
//! - Stored battle log inspection
//! - Scripted all-pass battles

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod inspect;
pub mod pass_battle;
pub mod transmute;
pub mod validate;

use std::path::PathBuf;

use thiserror::Error;

use stonewar_core::error::GameError;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A config parsed but breaks the rules.
    #[error("Invalid config '{}': {}", .path.display(), .problems.join("; "))]
    InvalidConfig {
        /// Offending file.
        path: PathBuf,
        /// Every problem found.
        problems: Vec<String>,
    },

    /// A composition argument was malformed.
    #[error("Bad composition '{0}': expected four comma-separated values in 0..=255")]
    BadComposition(String),

    /// The core rejected the input.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

pub(crate) fn read(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
