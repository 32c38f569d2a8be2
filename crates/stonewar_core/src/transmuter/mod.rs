//! Paying for a composition out of a silo stockpile.
//!
//! Whatever the silo holds of each needed element is taken directly. Any
//! shortfall is converted from surplus elements at fixed exchange rates
//! (orthogonal 2:1, opposite 4:1), choosing the cheapest mix.
//!
//! A transmuter that fails stays failed: later calls return the same error
//! without searching again. Callers build a fresh instance per attempt.
//!
//! # Example
//!
//! ```
//! use stonewar_core::composition::Composition;
//! use stonewar_core::transmuter::Transmuter;
//!
//! let mut transmuter = Transmuter::new(Composition::new(1, 2, 2, 2), Composition::new(2, 1, 0, 0));
//! // one Earth short: paid for with two Ice
//! assert_eq!(transmuter.get_cost().unwrap(), Composition::new(0, 0, 2, 0));
//! ```

mod solver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composition::{Composition, CompositionError};
use crate::element::{Element, ELEMENTS};

use solver::Problem;

/// Errors raised by transmutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmuteError {
    /// The silo cannot cover the need at any exchange.
    #[error("silo {silo} cannot cover {need}")]
    Insufficient {
        /// Silo contents offered.
        silo: Composition,
        /// Composition requested.
        need: Composition,
    },
}

/// Units of one element produced from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Element spent.
    pub from: Element,
    /// Element produced.
    pub to: Element,
    /// Units produced.
    pub produced: u32,
    /// Units spent.
    pub spent: u32,
}

/// How a need is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransmutePlan {
    /// Taken element for element from the silo.
    pub direct: Composition,
    /// Spent on conversions, per source element.
    pub converted: Composition,
    /// Individual conversions, by source then target element.
    pub conversions: Vec<Conversion>,
}

impl TransmutePlan {
    /// Everything drawn from the silo.
    pub fn total(&self) -> Result<Composition, CompositionError> {
        self.direct.checked_add(&self.converted)
    }

    /// True when no conversion was needed.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.conversions.is_empty()
    }
}

/// Solver for one silo/need pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmuter {
    silo: Composition,
    need: Composition,
    failure: Option<TransmuteError>,
}

impl Transmuter {
    /// New transmuter for `need` drawn from `silo`.
    #[must_use]
    pub const fn new(silo: Composition, need: Composition) -> Self {
        Self {
            silo,
            need,
            failure: None,
        }
    }

    /// Silo contents.
    #[must_use]
    pub const fn silo(&self) -> Composition {
        self.silo
    }

    /// Requested composition.
    #[must_use]
    pub const fn need(&self) -> Composition {
        self.need
    }

    /// True once a call has failed.
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// What the silo pays.
    ///
    /// When the silo covers the need element for element this is the need
    /// itself. Otherwise it is the surplus spent on conversions, per source
    /// element; the directly covered part is left to the caller.
    pub fn get_cost(&mut self) -> Result<Composition, TransmuteError> {
        let plan = self.plan()?;
        if plan.is_direct() {
            Ok(plan.direct)
        } else {
            Ok(plan.converted)
        }
    }

    /// Full breakdown of the payment.
    pub fn plan(&mut self) -> Result<TransmutePlan, TransmuteError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let result = self.solve();
        if let Err(err) = &result {
            tracing::warn!(silo = %self.silo, need = %self.need, "Transmutation failed");
            self.failure = Some(err.clone());
        }
        result
    }

    fn solve(&self) -> Result<TransmutePlan, TransmuteError> {
        let direct = self.silo.min(&self.need);
        let mut surplus = [0u8; 4];
        let mut shortfall = [0u8; 4];
        for element in ELEMENTS {
            let i = element.index();
            surplus[i] = self.silo.get(element) - direct.get(element);
            shortfall[i] = self.need.get(element) - direct.get(element);
        }
        let surplus = Composition::from(surplus);
        let shortfall = Composition::from(shortfall);

        if shortfall.is_zero() {
            return Ok(TransmutePlan {
                direct,
                ..TransmutePlan::default()
            });
        }
        if surplus.is_zero() {
            return Err(self.insufficient());
        }

        let problem = Problem::new(&surplus, &shortfall);
        let solution = problem.solve().ok_or_else(|| self.insufficient())?;
        tracing::debug!(
            nodes = solution.nodes,
            cost = solution.cost,
            "Solved transmutation"
        );

        let mut spent = [0u32; 4];
        let mut conversions = Vec::new();
        for (var, &produced) in problem.variables().iter().zip(&solution.values) {
            if produced == 0 {
                continue;
            }
            let cost = var.rate * produced;
            spent[var.source.index()] += cost;
            conversions.push(Conversion {
                from: var.source,
                to: var.target,
                produced,
                spent: cost,
            });
        }

        Ok(TransmutePlan {
            direct,
            converted: Composition::from(spent.map(|v| u8::try_from(v).unwrap_or(u8::MAX))),
            conversions,
        })
    }

    fn insufficient(&self) -> TransmuteError {
        TransmuteError::Insufficient {
            silo: self.silo,
            need: self.need,
        }
    }
}
