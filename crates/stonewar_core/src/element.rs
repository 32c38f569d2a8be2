//! The four elements and their fixed pairwise relations.
//!
//! Every element has exactly two orthogonal elements and one opposite.
//! The relation drives both stat derivation and the transmutation
//! exchange rates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four elements that make up every stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Earth - opposite Wind.
    Earth,
    /// Fire - opposite Ice.
    Fire,
    /// Ice - opposite Fire.
    Ice,
    /// Wind - opposite Earth.
    Wind,
}

/// All elements in canonical order.
pub const ELEMENTS: [Element; 4] = [Element::Earth, Element::Fire, Element::Ice, Element::Wind];

impl Element {
    /// Index of this element inside a composition vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Element::Earth => 0,
            Element::Fire => 1,
            Element::Ice => 2,
            Element::Wind => 3,
        }
    }

    /// Element at a composition index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Element::Earth),
            1 => Some(Element::Fire),
            2 => Some(Element::Ice),
            3 => Some(Element::Wind),
            _ => None,
        }
    }

    /// The opposite element.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Element::Earth => Element::Wind,
            Element::Fire => Element::Ice,
            Element::Ice => Element::Fire,
            Element::Wind => Element::Earth,
        }
    }

    /// The two orthogonal elements, in canonical order.
    #[must_use]
    pub const fn orthogonals(self) -> [Self; 2] {
        match self {
            Element::Earth => [Element::Fire, Element::Ice],
            Element::Fire => [Element::Earth, Element::Wind],
            Element::Ice => [Element::Earth, Element::Wind],
            Element::Wind => [Element::Fire, Element::Ice],
        }
    }

    /// How `other` relates to this element.
    #[must_use]
    pub fn relation(self, other: Self) -> ElementRelation {
        if self == other {
            ElementRelation::Same
        } else if self.opposite() == other {
            ElementRelation::Opposite
        } else {
            ElementRelation::Orthogonal
        }
    }

    /// Lowercase name used in API views and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Element::Earth => "earth",
            Element::Fire => "fire",
            Element::Ice => "ice",
            Element::Wind => "wind",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relation between two elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementRelation {
    /// Both elements are the same.
    Same,
    /// The elements are adjacent on the element wheel.
    Orthogonal,
    /// The elements are opposite on the element wheel.
    Opposite,
}

impl ElementRelation {
    /// Units of the source element consumed per unit of the target element.
    ///
    /// Same 1:1, orthogonal 2:1, opposite 4:1.
    #[must_use]
    pub const fn exchange_rate(self) -> u32 {
        match self {
            ElementRelation::Same => 1,
            ElementRelation::Orthogonal => 2,
            ElementRelation::Opposite => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_symmetric() {
        for element in ELEMENTS {
            assert_eq!(element.opposite().opposite(), element);
            assert_ne!(element.opposite(), element);
        }
    }

    #[test]
    fn test_orthogonals_exclude_self_and_opposite() {
        for element in ELEMENTS {
            for orth in element.orthogonals() {
                assert_ne!(orth, element);
                assert_ne!(orth, element.opposite());
                assert!(orth.orthogonals().contains(&element));
            }
        }
    }

    #[test]
    fn test_exchange_rates() {
        assert_eq!(Element::Earth.relation(Element::Earth).exchange_rate(), 1);
        assert_eq!(Element::Earth.relation(Element::Ice).exchange_rate(), 2);
        assert_eq!(Element::Earth.relation(Element::Fire).exchange_rate(), 2);
        assert_eq!(Element::Earth.relation(Element::Wind).exchange_rate(), 4);
    }

    #[test]
    fn test_index_round_trip() {
        for element in ELEMENTS {
            assert_eq!(Element::from_index(element.index()), Some(element));
        }
        assert_eq!(Element::from_index(4), None);
    }
}
