//! Stones: bounded four-element currency.
//!
//! A [`Stone`] is a [`Composition`] with a per-element limit. Anything with
//! elemental mass (tiles, units, weapons, the silo) exposes it through the
//! [`Elemental`] trait instead of inheriting from a common base.
//!
//! Stones compare by total value only: two stones holding different
//! elements but the same sum are equal. Sorting and dedup in the
//! stronghold layer rely on this.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composition::{Composition, CompositionError};
use crate::element::{Element, ELEMENTS};

/// Errors raised by stone arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoneError {
    /// A split asked for more of an element than the stone holds.
    #[error("insufficient {element}: requested {requested}, available {available}")]
    Insufficient {
        /// Element that ran short.
        element: Element,
        /// Amount requested.
        requested: u8,
        /// Amount available.
        available: u8,
    },
}

/// Anything that carries an elemental composition.
pub trait Elemental {
    /// The elemental composition.
    fn composition(&self) -> &Composition;

    /// Total elemental value.
    fn value(&self) -> u32 {
        self.composition().value()
    }
}

/// A composition with a per-element capacity ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawStone")]
pub struct Stone {
    comp: Composition,
    limit: Composition,
}

/// Unchecked wire form; decoding goes through [`Stone::with_limit`].
#[derive(Deserialize)]
struct RawStone {
    comp: Composition,
    limit: Composition,
}

impl TryFrom<RawStone> for Stone {
    type Error = CompositionError;

    fn try_from(raw: RawStone) -> Result<Self, Self::Error> {
        Self::with_limit(raw.comp, raw.limit)
    }
}

impl Stone {
    /// Create a stone with the default limit of 255 per element.
    #[must_use]
    pub const fn new(comp: Composition) -> Self {
        Self {
            comp,
            limit: Composition::MAX,
        }
    }

    /// Empty stone with the default limit.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Composition::ZERO)
    }

    /// Create a stone with an explicit limit.
    pub fn with_limit(comp: Composition, limit: Composition) -> Result<Self, CompositionError> {
        for element in ELEMENTS {
            if comp.get(element) > limit.get(element) {
                return Err(CompositionError::ExceedsLimit {
                    element,
                    value: comp.get(element),
                    limit: limit.get(element),
                });
            }
        }
        Ok(Self { comp, limit })
    }

    /// Current composition.
    #[must_use]
    pub const fn comp(&self) -> Composition {
        self.comp
    }

    /// Per-element limit.
    #[must_use]
    pub const fn limit(&self) -> Composition {
        self.limit
    }

    /// True when the stone holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comp.is_zero()
    }

    /// Room left under the limit for each element.
    #[must_use]
    pub fn headroom(&self) -> Composition {
        // limit >= comp elementwise
        let mut out = Composition::ZERO;
        for element in ELEMENTS {
            out = out.with(element, self.limit.get(element) - self.comp.get(element));
        }
        out
    }

    /// Absorb as much of `other` as fits under the limit.
    ///
    /// Returns the residual stone if anything did not fit, or `None` when
    /// `other` was fully absorbed.
    pub fn imbue(&mut self, other: Stone) -> Option<Stone> {
        let mut residual = other;
        for element in ELEMENTS {
            let room = self.limit.get(element) - self.comp.get(element);
            let offered = residual.comp.get(element);
            let taken = room.min(offered);
            self.comp = self.comp.with(element, self.comp.get(element) + taken);
            residual.comp = residual.comp.with(element, offered - taken);
        }

        if residual.is_empty() {
            None
        } else {
            Some(residual)
        }
    }

    /// Remove exactly `comp` from this stone into a new one.
    ///
    /// Leaves `self` untouched on failure.
    pub fn split(&mut self, comp: Composition) -> Result<Stone, StoneError> {
        for element in ELEMENTS {
            let available = self.comp.get(element);
            let requested = comp.get(element);
            if requested > available {
                return Err(StoneError::Insufficient {
                    element,
                    requested,
                    available,
                });
            }
        }

        let mut remaining = self.comp;
        for element in ELEMENTS {
            remaining = remaining.with(element, self.comp.get(element) - comp.get(element));
        }
        self.comp = remaining;
        Ok(Stone::new(comp))
    }

    /// Split off the floor-half of every element as post-battle spoils.
    pub fn extract_award(&mut self) -> Stone {
        let award = self.comp.halved();
        let mut remaining = self.comp;
        for element in ELEMENTS {
            remaining = remaining.with(element, self.comp.get(element) - award.get(element));
        }
        self.comp = remaining;
        Stone::new(award)
    }
}

impl Default for Stone {
    fn default() -> Self {
        Self::empty()
    }
}

impl Elemental for Stone {
    fn composition(&self) -> &Composition {
        &self.comp
    }
}

impl From<Composition> for Stone {
    fn from(comp: Composition) -> Self {
        Self::new(comp)
    }
}

impl PartialEq for Stone {
    fn eq(&self, other: &Self) -> bool {
        self.comp.value() == other.comp.value()
    }
}

impl Eq for Stone {}

impl PartialOrd for Stone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Stone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comp.value().cmp(&other.comp.value())
    }
}
