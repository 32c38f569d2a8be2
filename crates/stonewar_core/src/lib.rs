//! # Stonewar Core
//!
//! Deterministic simulation core for Stonewar.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (integers, with fixed-point for scaling)
//!
//! Callers (the world, field and stronghold layers) construct values,
//! drive the operations below and persist the results.
//!
//! ## Crate Structure
//!
//! - [`element`], [`composition`], [`stone`] - four-element currency
//! - [`transmuter`] - converting a silo stockpile into a needed composition
//! - [`hex`], [`grid`] - axial hex geometry and the tile grid
//! - [`units`], [`weapons`], [`squad`] - combatants and their containers
//! - [`battlefield`] - occupancy, movement and the damage model
//! - [`action_queue`] - deterministic turn order
//! - [`battle`] - the battle state machine
//! - [`config`] - RON-loadable battle rules
//! - [`view`] - plain JSON projections for the RPC layer

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action_queue;
pub mod battle;
pub mod battlefield;
pub mod composition;
pub mod config;
pub mod element;
pub mod error;
pub mod grid;
pub mod hex;
pub mod math;
pub mod squad;
pub mod stone;
pub mod transmuter;
pub mod units;
pub mod view;
pub mod weapons;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action_queue::ActionQueue;
    pub use crate::battle::{
        Action, ActionKind, ActionOutcome, ActionRequest, Battle, BattleEndCallback, BattleStatus,
        Field, GameOverCondition, Timestamp,
    };
    pub use crate::battlefield::{Battlefield, DamageOutcome, Hit, Side};
    pub use crate::composition::Composition;
    pub use crate::config::BattleConfig;
    pub use crate::element::Element;
    pub use crate::error::{GameError, Result};
    pub use crate::grid::{Adjacency, Grid, Tile};
    pub use crate::hex::{Direction, Hex};
    pub use crate::squad::Squad;
    pub use crate::stone::{Elemental, Stone};
    pub use crate::transmuter::Transmuter;
    pub use crate::units::{Unit, UnitId, UnitIdAllocator};
    pub use crate::view::ApiView;
    pub use crate::weapons::{Weapon, WeaponType};
}
