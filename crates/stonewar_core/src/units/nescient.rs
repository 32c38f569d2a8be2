//! Nescient bodies and types.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::element::Element;
use crate::hex::{Direction, Hex};

/// Species of a nescient, from its element and its dominant orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NescientType {
    /// Earth with Fire.
    Magma,
    /// Earth with Ice.
    Glacier,
    /// Fire with Earth.
    Volcano,
    /// Fire with Wind.
    Firestorm,
    /// Ice with Earth.
    Permafrost,
    /// Ice with Wind.
    Icestorm,
    /// Wind with Fire.
    Sirocco,
    /// Wind with Ice.
    Blizzard,
}

impl NescientType {
    /// Pick the type for a nescient of `element`.
    ///
    /// The first orthogonal decides unless it is absent, in which case the
    /// second one does.
    #[must_use]
    pub fn classify(element: Element, comp: &Composition) -> Self {
        let [first, second] = element.orthogonals();
        let flavor = if comp.get(first) == 0 { second } else { first };
        match (element, flavor) {
            (Element::Earth, Element::Fire) => NescientType::Magma,
            (Element::Earth, _) => NescientType::Glacier,
            (Element::Fire, Element::Earth) => NescientType::Volcano,
            (Element::Fire, _) => NescientType::Firestorm,
            (Element::Ice, Element::Earth) => NescientType::Permafrost,
            (Element::Ice, _) => NescientType::Icestorm,
            (Element::Wind, Element::Fire) => NescientType::Sirocco,
            (Element::Wind, _) => NescientType::Blizzard,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            NescientType::Magma => "Magma",
            NescientType::Glacier => "Glacier",
            NescientType::Volcano => "Volcano",
            NescientType::Firestorm => "Firestorm",
            NescientType::Permafrost => "Permafrost",
            NescientType::Icestorm => "Icestorm",
            NescientType::Sirocco => "Sirocco",
            NescientType::Blizzard => "Blizzard",
        }
    }
}

/// The four tiles a placed nescient covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NescientBody {
    /// Front tile; the nescient's location.
    pub head: Hex,
    /// Tile left of the head-tail axis.
    pub left: Hex,
    /// Tile right of the head-tail axis.
    pub right: Hex,
    /// Rear tile.
    pub tail: Hex,
}

impl NescientBody {
    /// Body with its head at `head`, facing `facing`.
    ///
    /// Left and right are the two hexes adjacent to both head and tail.
    #[must_use]
    pub fn new(head: Hex, facing: Direction) -> Self {
        Self {
            head,
            left: head.neighbor(facing.rotate(-2)),
            right: head.neighbor(facing.rotate(2)),
            tail: head.neighbor(facing.opposite()),
        }
    }

    /// All four tiles, head first.
    #[must_use]
    pub const fn parts(&self) -> [Hex; 4] {
        [self.head, self.left, self.right, self.tail]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_uses_first_orthogonal() {
        let comp = Composition::new(10, 2, 3, 0);
        assert_eq!(NescientType::classify(Element::Earth, &comp), NescientType::Magma);
    }

    #[test]
    fn test_classify_falls_back_when_first_is_zero() {
        let comp = Composition::new(0, 0, 10, 4);
        assert_eq!(NescientType::classify(Element::Ice, &comp), NescientType::Icestorm);
    }

    #[test]
    fn test_body_is_compact() {
        let body = NescientBody::new(Hex::new(1, 1), Direction::North);
        assert_eq!(body.tail, Hex::new(1, 2));
        for side in [body.left, body.right] {
            assert_eq!(side.distance(body.head), 1);
            assert_eq!(side.distance(body.tail), 1);
        }
        assert_ne!(body.left, body.right);
    }
}
