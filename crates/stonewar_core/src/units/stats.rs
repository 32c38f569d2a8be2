//! Combat stats derived from a composition.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::element::Element;

/// Combat stats, a pure function of a unit's composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Physical base.
    pub p: i32,
    /// Magical base.
    pub m: i32,
    /// Shared attack base.
    pub atk: i32,
    /// Shared defense base.
    pub defe: i32,
    /// Physical attack.
    pub patk: i32,
    /// Physical defense.
    pub pdef: i32,
    /// Magical attack.
    pub matk: i32,
    /// Magical defense.
    pub mdef: i32,
    /// Maximum hit points.
    pub hp: i32,
}

impl Stats {
    /// Derive stats from a composition.
    ///
    /// Earth and Ice feed the physical base, Fire and Wind the magical base;
    /// Fire and Ice favor attack, Earth and Wind defense.
    #[must_use]
    pub fn from_composition(comp: &Composition) -> Self {
        let e = i32::from(comp.get(Element::Earth));
        let f = i32::from(comp.get(Element::Fire));
        let i = i32::from(comp.get(Element::Ice));
        let w = i32::from(comp.get(Element::Wind));
        let value = e + f + i + w;

        let p = 2 * (e + i) + f + w + 2 * value;
        let m = 2 * (f + w) + e + i + 2 * value;
        let atk = 2 * (f + i) + e + w + 4 * value;
        let defe = 2 * (e + w) + f + i;
        let pdef = p + defe + 2 * e;
        let patk = p + atk + 2 * f;
        let matk = m + atk + 2 * i;
        let mdef = m + defe + 2 * w;
        let hp = 4 * (pdef + mdef + value);

        Self {
            p,
            m,
            atk,
            defe,
            patk,
            pdef,
            matk,
            mdef,
            hp,
        }
    }

    /// Same stats with hit points scaled by `factor`.
    #[must_use]
    pub fn with_hp_factor(mut self, factor: i32) -> Self {
        self.hp *= factor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_composition_has_no_stats() {
        assert_eq!(Stats::from_composition(&Composition::ZERO), Stats::default());
    }

    #[test]
    fn test_pure_earth() {
        let stats = Stats::from_composition(&Composition::new(10, 0, 0, 0));
        assert_eq!(stats.p, 40);
        assert_eq!(stats.m, 30);
        assert_eq!(stats.atk, 50);
        assert_eq!(stats.defe, 20);
        assert_eq!(stats.pdef, 80);
        assert_eq!(stats.patk, 90);
        assert_eq!(stats.matk, 80);
        assert_eq!(stats.mdef, 50);
        assert_eq!(stats.hp, 4 * (80 + 50 + 10));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let comp = Composition::new(7, 3, 2, 0);
        assert_eq!(Stats::from_composition(&comp), Stats::from_composition(&comp));
    }
}
