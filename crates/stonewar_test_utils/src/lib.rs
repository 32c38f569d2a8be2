//! # Stonewar Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Unit, squad and battle fixtures
//! - Determinism harness for scripted battles
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
