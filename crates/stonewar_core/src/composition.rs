//! The four-element composition vector.
//!
//! A [`Composition`] is the raw `{Earth, Fire, Ice, Wind}` vector carried by
//! every stone, tile, unit and weapon. Each element lies in `[0, 255]`; every
//! fallible constructor funnels through [`Composition::try_from_values`].

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::{Element, ELEMENTS};

/// Largest value a single element can hold.
pub const MAX_ELEMENT: u8 = u8::MAX;

/// Errors raised when a composition leaves its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// An element value fell outside `[0, 255]`.
    #[error("{element} value {value} is outside [0, 255]")]
    OutOfRange {
        /// Offending element.
        element: Element,
        /// Offending value.
        value: i64,
    },

    /// An element value exceeds the stone's limit for that element.
    #[error("{element} value {value} exceeds limit {limit}")]
    ExceedsLimit {
        /// Offending element.
        element: Element,
        /// Offending value.
        value: u8,
        /// Limit for that element.
        limit: u8,
    },
}

/// An exact four-element vector, each element in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Composition([u8; 4]);

impl Composition {
    /// Empty composition.
    pub const ZERO: Self = Self([0; 4]);

    /// Composition with every element at its maximum.
    pub const MAX: Self = Self([MAX_ELEMENT; 4]);

    /// Create a composition from in-range element values.
    #[must_use]
    pub const fn new(earth: u8, fire: u8, ice: u8, wind: u8) -> Self {
        Self([earth, fire, ice, wind])
    }

    /// Composition with every element set to `value`.
    #[must_use]
    pub const fn uniform(value: u8) -> Self {
        Self([value; 4])
    }

    /// Composition holding `value` of a single element.
    #[must_use]
    pub fn single(element: Element, value: u8) -> Self {
        Self::ZERO.with(element, value)
    }

    /// Validate and build a composition from arbitrary integers.
    pub fn try_from_values(values: [i64; 4]) -> Result<Self, CompositionError> {
        let mut out = [0u8; 4];
        for element in ELEMENTS {
            let value = values[element.index()];
            out[element.index()] = u8::try_from(value)
                .map_err(|_| CompositionError::OutOfRange { element, value })?;
        }
        Ok(Self(out))
    }

    /// Validate and build a composition from an element mapping.
    ///
    /// Missing elements are zero.
    pub fn from_map(map: &BTreeMap<Element, i64>) -> Result<Self, CompositionError> {
        let mut values = [0i64; 4];
        for (element, value) in map {
            values[element.index()] = *value;
        }
        Self::try_from_values(values)
    }

    /// Raw element values in canonical order.
    #[must_use]
    pub const fn values(&self) -> [u8; 4] {
        self.0
    }

    /// Value of one element.
    #[must_use]
    pub const fn get(&self, element: Element) -> u8 {
        self.0[element.index()]
    }

    /// Copy of this composition with one element replaced.
    #[must_use]
    pub fn with(mut self, element: Element, value: u8) -> Self {
        self.0[element.index()] = value;
        self
    }

    /// Total elemental value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0.iter().map(|&v| u32::from(v)).sum()
    }

    /// True when every element is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// True when every element is `<=` the corresponding element of `other`.
    #[must_use]
    pub fn fits_within(&self, other: &Self) -> bool {
        ELEMENTS.iter().all(|&e| self.get(e) <= other.get(e))
    }

    /// Iterate `(element, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, u8)> + '_ {
        ELEMENTS.iter().map(move |&e| (e, self.get(e)))
    }

    /// Elementwise sum, failing if any element overflows 255.
    pub fn checked_add(&self, other: &Self) -> Result<Self, CompositionError> {
        let mut values = [0i64; 4];
        for element in ELEMENTS {
            values[element.index()] = i64::from(self.get(element)) + i64::from(other.get(element));
        }
        Self::try_from_values(values)
    }

    /// Elementwise difference, failing if any element would go negative.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, CompositionError> {
        let mut values = [0i64; 4];
        for element in ELEMENTS {
            values[element.index()] = i64::from(self.get(element)) - i64::from(other.get(element));
        }
        Self::try_from_values(values)
    }

    /// Elementwise minimum.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        let mut out = *self;
        for element in ELEMENTS {
            out.0[element.index()] = self.get(element).min(other.get(element));
        }
        out
    }

    /// Elementwise floor-half.
    #[must_use]
    pub fn halved(&self) -> Self {
        Self(self.0.map(|v| v / 2))
    }
}

impl Index<Element> for Composition {
    type Output = u8;

    fn index(&self, element: Element) -> &Self::Output {
        &self.0[element.index()]
    }
}

impl From<[u8; 4]> for Composition {
    fn from(values: [u8; 4]) -> Self {
        Self(values)
    }
}

impl TryFrom<[i64; 4]> for Composition {
    type Error = CompositionError;

    fn try_from(values: [i64; 4]) -> Result<Self, Self::Error> {
        Self::try_from_values(values)
    }
}

impl TryFrom<&BTreeMap<Element, i64>> for Composition {
    type Error = CompositionError;

    fn try_from(map: &BTreeMap<Element, i64>) -> Result<Self, Self::Error> {
        Self::from_map(map)
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [e, fi, i, w] = self.0;
        write!(f, "E{e} F{fi} I{i} W{w}")
    }
}
