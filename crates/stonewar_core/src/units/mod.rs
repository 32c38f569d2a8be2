//! Units: scients and nescients.
//!
//! A unit is an elemental body with an identity, derived combat stats and a
//! place in the world. Scients are player-controlled, take one tile and
//! carry at most one weapon. Nescients are autonomous, take four tiles and
//! fight with their own body.
//!
//! Unit ids come from a [`UnitIdAllocator`] owned by the world layer; there
//! is no global counter.

mod nescient;
mod stats;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use nescient::{NescientBody, NescientType};
pub use stats::Stats;

use crate::composition::Composition;
use crate::element::Element;
use crate::hex::{Direction, Hex};
use crate::squad::SquadId;
use crate::stone::{Elemental, Stone};
use crate::weapons::{Weapon, WeaponType};

/// Unique identifier for units.
pub type UnitId = u64;

/// Identifier of the player owning a unit or squad.
pub type PlayerId = u64;

/// Move range of a scient, in hex steps.
pub const SCIENT_MOVE: u32 = 4;

/// Move range of a nescient, in hex steps.
pub const NESCIENT_MOVE: u32 = 2;

/// Errors raised when building or equipping units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The primary element is absent.
    #[error("composition has no {element}")]
    MissingPrimary {
        /// Primary element.
        element: Element,
    },

    /// The opposite of the primary element is present.
    #[error("{element} unit cannot hold {value} {opposite}")]
    OppositePresent {
        /// Primary element.
        element: Element,
        /// Its opposite.
        opposite: Element,
        /// Offending amount.
        value: u8,
    },

    /// A scient's orthogonal element exceeds half its primary element.
    #[error("{orthogonal} value {value} exceeds cap {cap}")]
    OrthogonalTooLarge {
        /// Offending orthogonal element.
        orthogonal: Element,
        /// Offending amount.
        value: u8,
        /// Allowed maximum.
        cap: u8,
    },

    /// Only scients equip weapons.
    #[error("unit {0} cannot equip weapons")]
    CannotEquip(UnitId),
}

/// Hands out monotonically increasing unit ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIdAllocator {
    next: UnitId,
}

impl UnitIdAllocator {
    /// Allocator starting at id 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocator resuming after previously issued ids.
    #[must_use]
    pub const fn starting_at(next: UnitId) -> Self {
        Self { next }
    }

    /// Issue the next id.
    pub fn allocate(&mut self) -> UnitId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> UnitId {
        self.next
    }
}

impl Default for UnitIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a unit is held: squad id and slot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Owning squad.
    pub squad: SquadId,
    /// Position within the squad.
    pub slot: usize,
}

/// Variant-specific unit data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-controlled, one tile, optional weapon.
    Scient {
        /// Equipped weapon.
        weapon: Option<Weapon>,
    },
    /// Autonomous, four tiles, fights with its own body.
    Nescient {
        /// Derived species.
        nescient_type: NescientType,
        /// Facing used to lay out the body.
        facing: Direction,
    },
}

/// What a unit attacks with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackProfile {
    /// Composition added to per-element damage.
    pub comp: Composition,
    /// Pattern, kind and reach.
    pub weapon_type: WeaponType,
}

/// Something that can be hurt and healed.
pub trait Damageable {
    /// Current hit points.
    fn hp(&self) -> i32;

    /// Maximum hit points.
    fn max_hp(&self) -> i32;

    /// Subtract `amount` (negative heals, capped at max) and return the new hp.
    fn take_damage(&mut self, amount: i32) -> i32;

    /// True while hit points remain.
    fn is_alive(&self) -> bool {
        self.hp() > 0
    }
}

/// A combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    name: String,
    element: Element,
    comp: Composition,
    stats: Stats,
    hp: i32,
    location: Option<Hex>,
    owner: Option<PlayerId>,
    container: Option<ContainerRef>,
    kind: UnitKind,
}

impl Unit {
    /// Build a scient.
    ///
    /// The primary element must be present, its opposite absent, and each
    /// orthogonal element at most half the primary.
    pub fn scient(
        id: UnitId,
        name: impl Into<String>,
        element: Element,
        comp: Composition,
    ) -> Result<Self, UnitError> {
        check_primary(element, &comp)?;
        let cap = comp.get(element) / 2;
        for orthogonal in element.orthogonals() {
            let value = comp.get(orthogonal);
            if value > cap {
                return Err(UnitError::OrthogonalTooLarge {
                    orthogonal,
                    value,
                    cap,
                });
            }
        }
        Ok(Self::build(
            id,
            name.into(),
            element,
            comp,
            Stats::from_composition(&comp),
            UnitKind::Scient { weapon: None },
        ))
    }

    /// Build a nescient facing `facing`.
    pub fn nescient(
        id: UnitId,
        name: impl Into<String>,
        element: Element,
        comp: Composition,
        facing: Direction,
    ) -> Result<Self, UnitError> {
        check_primary(element, &comp)?;
        let kind = UnitKind::Nescient {
            nescient_type: NescientType::classify(element, &comp),
            facing,
        };
        Ok(Self::build(
            id,
            name.into(),
            element,
            comp,
            Stats::from_composition(&comp).with_hp_factor(2),
            kind,
        ))
    }

    fn build(
        id: UnitId,
        name: String,
        element: Element,
        comp: Composition,
        stats: Stats,
        kind: UnitKind,
    ) -> Self {
        Self {
            id,
            name,
            element,
            comp,
            stats,
            hp: stats.hp,
            location: None,
            owner: None,
            container: None,
            kind,
        }
    }

    /// Unit id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary element.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.element
    }

    /// Elemental composition.
    #[must_use]
    pub const fn comp(&self) -> Composition {
        self.comp
    }

    /// Derived stats.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Variant data.
    #[must_use]
    pub const fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// True for scients.
    #[must_use]
    pub const fn is_scient(&self) -> bool {
        matches!(self.kind, UnitKind::Scient { .. })
    }

    /// Squad slots this unit takes.
    #[must_use]
    pub const fn size(&self) -> u32 {
        match self.kind {
            UnitKind::Scient { .. } => 1,
            UnitKind::Nescient { .. } => 2,
        }
    }

    /// Hex steps this unit may move per action.
    #[must_use]
    pub const fn move_range(&self) -> u32 {
        match self.kind {
            UnitKind::Scient { .. } => SCIENT_MOVE,
            UnitKind::Nescient { .. } => NESCIENT_MOVE,
        }
    }

    /// Current location, `None` when not on a grid.
    #[must_use]
    pub const fn location(&self) -> Option<Hex> {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: Option<Hex>) {
        self.location = location;
    }

    /// Owning player.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Assign an owning player.
    pub fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.owner = owner;
    }

    /// Squad and slot holding this unit.
    #[must_use]
    pub const fn container(&self) -> Option<ContainerRef> {
        self.container
    }

    pub(crate) fn set_container(&mut self, container: Option<ContainerRef>) {
        self.container = container;
    }

    /// Equipped weapon, scients only.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            UnitKind::Scient { weapon } => weapon.as_ref(),
            UnitKind::Nescient { .. } => None,
        }
    }

    /// Equip a weapon, returning the one previously held.
    pub fn equip(&mut self, new_weapon: Weapon) -> Result<Option<Weapon>, UnitError> {
        match &mut self.kind {
            UnitKind::Scient { weapon } => Ok(weapon.replace(new_weapon)),
            UnitKind::Nescient { .. } => Err(UnitError::CannotEquip(self.id)),
        }
    }

    /// Remove and return the equipped weapon.
    pub fn unequip(&mut self) -> Option<Weapon> {
        match &mut self.kind {
            UnitKind::Scient { weapon } => weapon.take(),
            UnitKind::Nescient { .. } => None,
        }
    }

    /// Nescient species.
    #[must_use]
    pub const fn nescient_type(&self) -> Option<NescientType> {
        match self.kind {
            UnitKind::Nescient { nescient_type, .. } => Some(nescient_type),
            UnitKind::Scient { .. } => None,
        }
    }

    /// Tiles this unit would cover with its location at `at`.
    #[must_use]
    pub fn footprint(&self, at: Hex) -> Vec<Hex> {
        match self.kind {
            UnitKind::Scient { .. } => vec![at],
            UnitKind::Nescient { facing, .. } => NescientBody::new(at, facing).parts().to_vec(),
        }
    }

    /// Tiles this unit currently covers.
    #[must_use]
    pub fn occupied_tiles(&self) -> Vec<Hex> {
        self.location.map(|at| self.footprint(at)).unwrap_or_default()
    }

    /// What this unit attacks with; unarmed scients have nothing.
    #[must_use]
    pub fn attack_profile(&self) -> Option<AttackProfile> {
        match &self.kind {
            UnitKind::Scient { weapon } => weapon.map(|w| AttackProfile {
                comp: w.comp(),
                weapon_type: w.weapon_type(),
            }),
            UnitKind::Nescient { .. } => Some(AttackProfile {
                comp: self.comp,
                weapon_type: WeaponType::from_element(self.element),
            }),
        }
    }

    /// The unit's mass as a stone, for post-battle spoils.
    #[must_use]
    pub fn remains(&self) -> Stone {
        Stone::new(self.comp)
    }
}

impl Elemental for Unit {
    fn composition(&self) -> &Composition {
        &self.comp
    }
}

impl Damageable for Unit {
    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.stats.hp
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        self.hp = self.hp.saturating_sub(amount);
        if amount < 0 {
            self.hp = self.hp.min(self.stats.hp);
        }
        self.hp
    }
}

fn check_primary(element: Element, comp: &Composition) -> Result<(), UnitError> {
    if comp.get(element) == 0 {
        return Err(UnitError::MissingPrimary { element });
    }
    let opposite = element.opposite();
    let value = comp.get(opposite);
    if value != 0 {
        return Err(UnitError::OppositePresent {
            element,
            opposite,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_scient() -> Unit {
        Unit::scient(1, "Ash", Element::Fire, Composition::new(4, 10, 0, 5)).unwrap()
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = UnitIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
        assert_eq!(ids.peek(), b + 1);
    }

    #[test]
    fn test_scient_validation() {
        assert!(matches!(
            Unit::scient(1, "x", Element::Fire, Composition::new(0, 0, 0, 1)),
            Err(UnitError::MissingPrimary { .. })
        ));
        assert!(matches!(
            Unit::scient(1, "x", Element::Fire, Composition::new(0, 10, 1, 0)),
            Err(UnitError::OppositePresent { .. })
        ));
        assert_eq!(
            Unit::scient(1, "x", Element::Fire, Composition::new(6, 10, 0, 0)).unwrap_err(),
            UnitError::OrthogonalTooLarge {
                orthogonal: Element::Earth,
                value: 6,
                cap: 5
            }
        );
    }

    #[test]
    fn test_nescient_allows_large_orthogonals() {
        let unit =
            Unit::nescient(2, "Drake", Element::Earth, Composition::new(10, 10, 0, 0), Direction::North)
                .unwrap();
        assert_eq!(unit.nescient_type(), Some(NescientType::Magma));
        assert_eq!(unit.size(), 2);
        assert_eq!(unit.max_hp(), Stats::from_composition(&unit.comp()).hp * 2);
        assert_eq!(unit.footprint(Hex::ORIGIN).len(), 4);
        assert!(unit.attack_profile().is_some());
    }

    #[test]
    fn test_equip_and_profile() {
        let mut unit = fire_scient();
        assert!(unit.attack_profile().is_none());

        let bow = Weapon::new(Element::Fire, Composition::new(0, 3, 0, 0)).unwrap();
        assert!(unit.equip(bow).unwrap().is_none());
        let profile = unit.attack_profile().unwrap();
        assert_eq!(profile.weapon_type, WeaponType::Bow);
        assert_eq!(unit.unequip(), Some(bow));
    }

    #[test]
    fn test_heal_is_capped() {
        let mut unit = fire_scient();
        let max = unit.max_hp();
        unit.take_damage(10);
        assert_eq!(unit.hp(), max - 10);
        unit.take_damage(-50);
        assert_eq!(unit.hp(), max);
        unit.take_damage(max);
        assert!(!unit.is_alive());
    }
}
