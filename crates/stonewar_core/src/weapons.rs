//! Weapons and their attack patterns.
//!
//! A weapon's element fixes its type: Earth forges swords, Fire bows, Ice
//! wands and Wind gloves. The type in turn fixes the attack pattern, the
//! physical/magical kind, the reach and the damage-over-time duration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::element::Element;
use crate::stone::{Elemental, Stone};
use crate::units::UnitError;

/// How an attack selects and hurts its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Single adjacent target, full damage.
    Full,
    /// Single distant target, quartered damage.
    Ranged,
    /// Every unit inside a cone.
    Aoe,
    /// Single adjacent target, damage spread over several ticks.
    Dot,
}

/// Which stat pair an attack uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// `p` / `patk` against `p` / `pdef`.
    Physical,
    /// `m` / `matk` against `m` / `mdef`.
    Magical,
}

/// Weapon type, determined by the weapon's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    /// Earth melee weapon.
    Sword,
    /// Fire ranged weapon.
    Bow,
    /// Ice area weapon.
    Wand,
    /// Wind damage-over-time weapon.
    Glove,
}

/// Ticks a glove spreads its damage over.
pub const GLOVE_TIME: u32 = 3;

impl WeaponType {
    /// Weapon type forged from an element.
    #[must_use]
    pub const fn from_element(element: Element) -> Self {
        match element {
            Element::Earth => WeaponType::Sword,
            Element::Fire => WeaponType::Bow,
            Element::Ice => WeaponType::Wand,
            Element::Wind => WeaponType::Glove,
        }
    }

    /// Attack pattern.
    #[must_use]
    pub const fn pattern(self) -> AttackPattern {
        match self {
            WeaponType::Sword => AttackPattern::Full,
            WeaponType::Bow => AttackPattern::Ranged,
            WeaponType::Wand => AttackPattern::Aoe,
            WeaponType::Glove => AttackPattern::Dot,
        }
    }

    /// Physical or magical.
    #[must_use]
    pub const fn kind(self) -> AttackKind {
        match self {
            WeaponType::Sword | WeaponType::Bow => AttackKind::Physical,
            WeaponType::Wand | WeaponType::Glove => AttackKind::Magical,
        }
    }

    /// Reach in hex steps, inclusive.
    #[must_use]
    pub const fn reach(self) -> RangeInclusive<u32> {
        match self {
            WeaponType::Sword | WeaponType::Glove => 1..=1,
            WeaponType::Bow => 2..=6,
            WeaponType::Wand => 1..=4,
        }
    }

    /// Ticks the damage is spread over (1 for instant weapons).
    #[must_use]
    pub const fn time(self) -> u32 {
        match self {
            WeaponType::Glove => GLOVE_TIME,
            _ => 1,
        }
    }

    /// Display name used in API views.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            WeaponType::Sword => "Sword",
            WeaponType::Bow => "Bow",
            WeaponType::Wand => "Wand",
            WeaponType::Glove => "Glove",
        }
    }
}

/// A weapon: an elemental stone shaped into one of the four weapon types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    element: Element,
    comp: Composition,
    weapon_type: WeaponType,
}

impl Weapon {
    /// Forge a weapon of `element` from `comp`.
    ///
    /// The composition must contain some of the weapon's element.
    pub fn new(element: Element, comp: Composition) -> Result<Self, UnitError> {
        if comp.get(element) == 0 {
            return Err(UnitError::MissingPrimary { element });
        }
        Ok(Self {
            element,
            comp,
            weapon_type: WeaponType::from_element(element),
        })
    }

    /// Forge a weapon from a stone.
    pub fn from_stone(element: Element, stone: &Stone) -> Result<Self, UnitError> {
        Self::new(element, stone.comp())
    }

    /// Weapon element.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.element
    }

    /// Weapon composition.
    #[must_use]
    pub const fn comp(&self) -> Composition {
        self.comp
    }

    /// Weapon type.
    #[must_use]
    pub const fn weapon_type(&self) -> WeaponType {
        self.weapon_type
    }
}

impl Elemental for Weapon {
    fn composition(&self) -> &Composition {
        &self.comp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_follows_element() {
        let bow = Weapon::new(Element::Fire, Composition::new(0, 5, 0, 0)).unwrap();
        assert_eq!(bow.weapon_type(), WeaponType::Bow);
        assert_eq!(bow.weapon_type().pattern(), AttackPattern::Ranged);
        assert_eq!(bow.weapon_type().kind(), AttackKind::Physical);
    }

    #[test]
    fn test_weapon_requires_its_element() {
        let err = Weapon::new(Element::Ice, Composition::new(3, 0, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            UnitError::MissingPrimary {
                element: Element::Ice
            }
        );
    }

    #[test]
    fn test_only_gloves_spread_damage() {
        assert_eq!(WeaponType::Glove.time(), GLOVE_TIME);
        assert_eq!(WeaponType::Sword.time(), 1);
        assert_eq!(WeaponType::Wand.kind(), AttackKind::Magical);
    }
}
