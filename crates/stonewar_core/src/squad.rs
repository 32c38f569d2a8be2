//! Squads: ordered, size-capped unit containers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stone::Elemental;
use crate::units::{ContainerRef, Damageable, PlayerId, Unit, UnitId};

/// Unique identifier for squads.
pub type SquadId = u64;

/// Default number of slots in a squad.
pub const SQUAD_CAPACITY: u32 = 8;

/// Errors raised by squad membership changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquadError {
    /// Not enough free slots for the unit.
    #[error("squad {squad} has {free} free slots, unit {unit} needs {needed}")]
    Full {
        /// Squad id.
        squad: SquadId,
        /// Unit that did not fit.
        unit: UnitId,
        /// Slots the unit takes.
        needed: u32,
        /// Slots left.
        free: u32,
    },

    /// The unit is already a member.
    #[error("unit {0} is already in the squad")]
    Duplicate(UnitId),
}

/// An ordered group of units sharing one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    id: SquadId,
    name: String,
    owner: Option<PlayerId>,
    capacity: u32,
    units: Vec<Unit>,
}

impl Squad {
    /// Empty squad with the default capacity.
    #[must_use]
    pub fn new(id: SquadId, name: impl Into<String>, owner: Option<PlayerId>) -> Self {
        Self::with_capacity(id, name, owner, SQUAD_CAPACITY)
    }

    /// Empty squad with an explicit slot capacity.
    #[must_use]
    pub fn with_capacity(
        id: SquadId,
        name: impl Into<String>,
        owner: Option<PlayerId>,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            capacity,
            units: Vec::new(),
        }
    }

    /// Squad id.
    #[must_use]
    pub const fn id(&self) -> SquadId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning player.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Slot capacity.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Slots in use, weighted by unit size.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.units.iter().map(Unit::size).sum()
    }

    /// Slots left.
    #[must_use]
    pub fn free_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.size())
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when the squad has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Members in squad order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Member by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Mutable member by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id() == id)
    }

    /// Total elemental value of all members.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.units.iter().map(Elemental::value).sum()
    }

    /// Total remaining hit points of living members.
    #[must_use]
    pub fn hp(&self) -> i32 {
        self.units.iter().map(|u| u.hp().max(0)).sum()
    }

    /// Add a unit to the end of the squad.
    ///
    /// The unit takes the squad's owner and a container reference to its slot.
    pub fn append(&mut self, mut unit: Unit) -> Result<(), SquadError> {
        if self.get(unit.id()).is_some() {
            return Err(SquadError::Duplicate(unit.id()));
        }
        let free = self.free_slots();
        if unit.size() > free {
            return Err(SquadError::Full {
                squad: self.id,
                unit: unit.id(),
                needed: unit.size(),
                free,
            });
        }
        unit.set_owner(self.owner);
        unit.set_container(Some(ContainerRef {
            squad: self.id,
            slot: self.units.len(),
        }));
        self.units.push(unit);
        Ok(())
    }

    /// Remove a unit, clearing its container and renumbering later slots.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let position = self.units.iter().position(|u| u.id() == id)?;
        let mut unit = self.units.remove(position);
        unit.set_container(None);
        self.renumber();
        Some(unit)
    }

    /// Consume the squad, returning its members in order.
    #[must_use]
    pub fn into_units(self) -> Vec<Unit> {
        self.units
    }

    fn renumber(&mut self) {
        let squad = self.id;
        for (slot, unit) in self.units.iter_mut().enumerate() {
            unit.set_container(Some(ContainerRef { squad, slot }));
        }
    }
}
