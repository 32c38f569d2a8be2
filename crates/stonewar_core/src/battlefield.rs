//! Battlefield: occupancy, movement and the damage model.
//!
//! The battlefield owns one arena of unit records keyed by [`UnitId`].
//! Grid occupancy, squad rosters, the damage queue and the graveyard are all
//! id lookups into that arena, so a unit is never held in two places.
//!
//! Every mutating operation validates fully before it touches state; a
//! failed call leaves the battlefield unchanged.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composition::Composition;
use crate::element::{Element, ELEMENTS};
use crate::grid::Grid;
use crate::hex::Hex;
use crate::math::div_floor;
use crate::squad::{Squad, SquadError, SquadId};
use crate::units::{AttackProfile, Damageable, PlayerId, Unit, UnitId};
use crate::weapons::{AttackKind, AttackPattern, WeaponType};

/// Which squad a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The squad holding the field.
    Defender,
    /// The squad invading the field.
    Attacker,
}

impl Side {
    /// Both sides, defender first.
    pub const BOTH: [Side; 2] = [Side::Defender, Side::Attacker];

    const fn index(self) -> usize {
        match self {
            Side::Defender => 0,
            Side::Attacker => 1,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Side::Defender => Side::Attacker,
            Side::Attacker => Side::Defender,
        }
    }

    /// Lowercase name used in API views and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Side::Defender => "defender",
            Side::Attacker => "attacker",
        }
    }
}

/// Errors raised by battlefield operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattlefieldError {
    /// The hex is not on the grid.
    #[error("{0} is out of bounds")]
    OutOfBounds(Hex),

    /// Another unit stands on the hex.
    #[error("{0} is occupied")]
    Occupied(Hex),

    /// No unit (or not the expected unit) stands on the hex.
    #[error("nothing to act with or against at {0}")]
    Empty(Hex),

    /// The destination or target is beyond reach.
    #[error("{to} is out of range from {from}")]
    OutOfRange {
        /// Origin hex.
        from: Hex,
        /// Requested hex.
        to: Hex,
    },

    /// No such unit on this battlefield.
    #[error("unit {0} is not on this battlefield")]
    UnknownUnit(UnitId),

    /// The unit has no location.
    #[error("unit {0} is not placed")]
    NotPlaced(UnitId),

    /// The unit has been buried.
    #[error("unit {0} is dead")]
    Buried(UnitId),

    /// The unit has nothing to attack with.
    #[error("unit {0} has no weapon")]
    Unarmed(UnitId),

    /// The same unit appears in both squads.
    #[error("unit {0} appears twice")]
    DuplicateUnit(UnitId),
}

/// Result of applying damage to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// The unit survived; the amount applied (negative heals).
    Applied(i32),
    /// The unit died and was buried.
    Dead,
}

/// When a hit lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTiming {
    /// Applied immediately.
    Immediate,
    /// Queued and drained over `ticks` turns.
    Queued {
        /// Ticks the fragment stays queued.
        ticks: u32,
    },
}

/// One target's share of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Target unit.
    pub target: UnitId,
    /// Damage (negative heals).
    pub amount: i32,
    /// When it lands.
    pub timing: HitTiming,
}

/// A hit together with what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// The computed hit.
    pub hit: Hit,
    /// Outcome for immediate hits, `None` for queued ones.
    pub outcome: Option<DamageOutcome>,
}

/// A pending damage-over-time fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedDamage {
    /// Damage applied each tick while queued.
    pub amount: i32,
    /// Ticks remaining.
    pub ticks: u32,
}

/// Squad metadata kept while its units live in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadRoster {
    /// Squad id.
    pub id: SquadId,
    /// Squad name.
    pub name: String,
    /// Owning player.
    pub owner: Option<PlayerId>,
    /// Slot capacity.
    pub capacity: u32,
    /// Member ids in squad order.
    pub members: Vec<UnitId>,
}

/// Units handed back when a battle ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    /// Surviving defenders, in squad order.
    pub defender: Squad,
    /// Surviving attackers, in squad order.
    pub attacker: Squad,
    /// Buried units, in burial order.
    pub fallen: Vec<(Side, Unit)>,
}

/// A grid, two squads, a damage queue and a graveyard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlefield {
    grid: Grid,
    element: Element,
    units: BTreeMap<UnitId, Unit>,
    rosters: [SquadRoster; 2],
    damage_queue: BTreeMap<UnitId, Vec<QueuedDamage>>,
    graveyard: Vec<UnitId>,
}

impl Battlefield {
    /// Move both squads' units into a new battlefield.
    ///
    /// Units start unplaced; `element` is the field's terrain element.
    pub fn new(
        grid: Grid,
        element: Element,
        defender: Squad,
        attacker: Squad,
    ) -> Result<Self, BattlefieldError> {
        let mut units = BTreeMap::new();
        let defender = enlist(defender, &mut units)?;
        let attacker = enlist(attacker, &mut units)?;

        Ok(Self {
            grid,
            element,
            units,
            rosters: [defender, attacker],
            damage_queue: BTreeMap::new(),
            graveyard: Vec::new(),
        })
    }

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Terrain element of the field.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.element
    }

    /// Unit by id, living or buried.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Roster for one side.
    #[must_use]
    pub const fn roster(&self, side: Side) -> &SquadRoster {
        &self.rosters[side.index()]
    }

    /// Side a unit fights for.
    #[must_use]
    pub fn side_of(&self, id: UnitId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.roster(side).members.contains(&id))
    }

    /// Members of one side, in squad order.
    pub fn members(&self, side: Side) -> impl Iterator<Item = &Unit> {
        self.roster(side)
            .members
            .iter()
            .filter_map(|id| self.units.get(id))
    }

    /// Total remaining hit points of one side.
    #[must_use]
    pub fn squad_hp(&self, side: Side) -> i32 {
        self.members(side).map(|u| u.hp().max(0)).sum()
    }

    /// Total elemental value of one side.
    #[must_use]
    pub fn squad_value(&self, side: Side) -> u32 {
        self.members(side).map(|u| u.comp().value()).sum()
    }

    /// Buried unit ids, in burial order.
    #[must_use]
    pub fn graveyard(&self) -> &[UnitId] {
        &self.graveyard
    }

    /// True once a unit has been buried.
    #[must_use]
    pub fn is_buried(&self, id: UnitId) -> bool {
        self.graveyard.contains(&id)
    }

    /// Pending damage fragments for a unit, `None` if it is not registered.
    #[must_use]
    pub fn queued_damage(&self, id: UnitId) -> Option<&[QueuedDamage]> {
        self.damage_queue.get(&id).map(Vec::as_slice)
    }

    /// Living units on the grid and their locations.
    #[must_use]
    pub fn find_units(&self) -> BTreeMap<UnitId, Hex> {
        self.units
            .values()
            .filter(|u| !self.is_buried(u.id()))
            .filter_map(|u| u.location().map(|at| (u.id(), at)))
            .collect()
    }

    /// Living units without a location.
    #[must_use]
    pub fn unplaced(&self) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| !self.is_buried(u.id()) && u.location().is_none())
            .map(Unit::id)
            .collect()
    }

    /// Put a unit on the grid at `hex`.
    ///
    /// Every tile of the unit's footprint must be on the grid and free of
    /// other units. Re-placing a unit moves it.
    pub fn place(&mut self, id: UnitId, hex: Hex) -> Result<(), BattlefieldError> {
        let unit = self.living(id)?;
        let footprint = unit.footprint(hex);
        self.check_footprint(id, &footprint)?;

        let previous = unit.occupied_tiles();
        self.occupy(id, &previous, &footprint);
        self.damage_queue.insert(id, Vec::new());
        tracing::debug!(unit = id, %hex, "Placed unit");
        self.validate();
        Ok(())
    }

    /// Move a unit from `src` to `dst`.
    ///
    /// `dst` must be within the unit's move range from `src`, measured by
    /// ring expansion over the grid.
    pub fn move_unit(&mut self, id: UnitId, src: Hex, dst: Hex) -> Result<(), BattlefieldError> {
        let unit = self.living(id)?;
        if !self.grid.in_bounds(src) {
            return Err(BattlefieldError::OutOfBounds(src));
        }
        let on_src = self.grid.tile(src).and_then(|t| t.occupant());
        if unit.location() != Some(src) || on_src != Some(id) {
            return Err(BattlefieldError::Empty(src));
        }
        if !self.grid.range(src, unit.move_range()).contains(&dst) {
            return Err(BattlefieldError::OutOfRange { from: src, to: dst });
        }
        let footprint = unit.footprint(dst);
        self.check_footprint(id, &footprint)?;

        let previous = unit.occupied_tiles();
        self.occupy(id, &previous, &footprint);
        tracing::debug!(unit = id, %src, %dst, "Moved unit");
        self.validate();
        Ok(())
    }

    /// Hexes hit by an area attack from `src` aimed at `target`.
    ///
    /// The cone opens toward the target; when the target sits on the edge
    /// between two cones the first in clockwise order from North is used.
    #[must_use]
    pub fn calc_aoe(&self, src: Hex, target: Hex, distance: u32) -> BTreeSet<Hex> {
        match self.grid.distance_by_direction(src, target).keys().next() {
            Some(&direction) => self.grid.triangle(src, distance, direction),
            None => BTreeSet::new(),
        }
    }

    /// Raw damage from `attacker` to `defender`, before pattern scaling.
    ///
    /// Negative results heal.
    pub fn dmg(&self, attacker: UnitId, defender: UnitId) -> Result<i32, BattlefieldError> {
        let atkr = self.unit(attacker).ok_or(BattlefieldError::UnknownUnit(attacker))?;
        let defdr = self.unit(defender).ok_or(BattlefieldError::UnknownUnit(defender))?;
        let profile = atkr
            .attack_profile()
            .ok_or(BattlefieldError::Unarmed(attacker))?;
        let terrain = defdr
            .location()
            .and_then(|at| self.grid.tile(at))
            .map_or(Composition::ZERO, |t| t.comp());
        Ok(elemental_damage(atkr, &profile, defdr, &terrain))
    }

    /// Work out who an attack on `target` hits and for how much.
    pub fn calc_damage(&self, attacker: UnitId, target: Hex) -> Result<Vec<Hit>, BattlefieldError> {
        let atkr = self.living(attacker)?;
        let src = atkr.location().ok_or(BattlefieldError::NotPlaced(attacker))?;
        let profile = atkr
            .attack_profile()
            .ok_or(BattlefieldError::Unarmed(attacker))?;
        let weapon_type = profile.weapon_type;

        if !self.in_reach(src, target, weapon_type) {
            return Err(BattlefieldError::OutOfRange { from: src, to: target });
        }

        let pattern = weapon_type.pattern();
        let targets: Vec<UnitId> = if pattern == AttackPattern::Aoe {
            let area = self.calc_aoe(src, target, *weapon_type.reach().end());
            let hit: BTreeSet<UnitId> = area
                .iter()
                .filter_map(|&h| self.grid.tile(h).and_then(|t| t.occupant()))
                .filter(|&id| id != attacker)
                .collect();
            hit.into_iter().collect()
        } else {
            match self.grid.tile(target).and_then(|t| t.occupant()) {
                Some(id) if id != attacker => vec![id],
                _ => return Err(BattlefieldError::Empty(target)),
            }
        };

        let share = targets.len() as i32;
        let mut hits = Vec::with_capacity(targets.len());
        for id in targets {
            let mut amount = self.dmg(attacker, id)?;
            amount = match pattern {
                AttackPattern::Ranged => div_floor(amount, 4),
                AttackPattern::Aoe if weapon_type == WeaponType::Wand => div_floor(amount, share),
                _ => amount,
            };
            let timing = if pattern == AttackPattern::Dot {
                amount = div_floor(amount, weapon_type.time() as i32);
                HitTiming::Queued {
                    ticks: weapon_type.time(),
                }
            } else {
                HitTiming::Immediate
            };
            hits.push(Hit {
                target: id,
                amount,
                timing,
            });
        }
        Ok(hits)
    }

    /// Attack `target`, applying immediate hits and queueing the rest.
    pub fn attack(&mut self, attacker: UnitId, target: Hex) -> Result<Vec<Strike>, BattlefieldError> {
        let hits = self.calc_damage(attacker, target)?;
        let mut strikes = Vec::with_capacity(hits.len());
        for hit in hits {
            let outcome = match hit.timing {
                HitTiming::Immediate => Some(self.apply_dmg(hit.target, hit.amount)?),
                HitTiming::Queued { ticks } => {
                    self.queue_damage(hit.target, hit.amount, ticks);
                    None
                }
            };
            tracing::debug!(attacker, target = hit.target, amount = hit.amount, "Hit");
            strikes.push(Strike { hit, outcome });
        }
        Ok(strikes)
    }

    /// Subtract `amount` from a unit's hp, burying it at zero or below.
    ///
    /// `Applied` carries the hp actually lost, so a heal capped at max hp
    /// reports only what it restored.
    pub fn apply_dmg(&mut self, id: UnitId, amount: i32) -> Result<DamageOutcome, BattlefieldError> {
        self.living(id)?;
        let (before, after) = match self.units.get_mut(&id) {
            Some(unit) => (unit.hp(), unit.take_damage(amount)),
            None => return Err(BattlefieldError::UnknownUnit(id)),
        };
        if after <= 0 {
            self.bury(id);
            Ok(DamageOutcome::Dead)
        } else {
            Ok(DamageOutcome::Applied(before - after))
        }
    }

    /// Add a damage-over-time fragment for a unit.
    pub fn queue_damage(&mut self, id: UnitId, amount: i32, ticks: u32) {
        if ticks == 0 || self.is_buried(id) {
            return;
        }
        self.damage_queue
            .entry(id)
            .or_default()
            .push(QueuedDamage { amount, ticks });
    }

    /// Drain one tick of the damage queue.
    ///
    /// Every queued fragment of a unit contributes its full amount on every
    /// tick it remains queued; afterwards tick counters drop by one and
    /// exhausted fragments are pruned.
    pub fn apply_queued(&mut self) -> Vec<(UnitId, DamageOutcome)> {
        let pending: Vec<(UnitId, i32)> = self
            .damage_queue
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(&id, queue)| (id, queue.iter().map(|d| d.amount).sum()))
            .collect();

        let mut outcomes = Vec::with_capacity(pending.len());
        for (id, total) in pending {
            let Ok(outcome) = self.apply_dmg(id, total) else {
                continue;
            };
            if let Some(queue) = self.damage_queue.get_mut(&id) {
                for fragment in queue.iter_mut() {
                    fragment.ticks -= 1;
                }
                queue.retain(|d| d.ticks > 0);
            }
            outcomes.push((id, outcome));
        }
        outcomes
    }

    /// Remove a dead unit from the grid and the damage queue.
    pub fn bury(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let tiles = unit.occupied_tiles();
        unit.set_location(None);
        for hex in tiles {
            if let Some(tile) = self.grid.tile_mut(hex) {
                if tile.occupant() == Some(id) {
                    tile.set_occupant(None);
                }
            }
        }
        self.damage_queue.remove(&id);
        if !self.graveyard.contains(&id) {
            self.graveyard.push(id);
        }
        tracing::debug!(unit = id, "Buried unit");
        self.validate();
    }

    /// Hand the units back as squads, separating out the fallen.
    pub fn release(self) -> Result<Released, SquadError> {
        let Self {
            mut units,
            rosters,
            graveyard,
            ..
        } = self;
        let [defender_roster, attacker_roster] = rosters;

        let mut fallen = Vec::with_capacity(graveyard.len());
        for id in &graveyard {
            if let Some(mut unit) = units.remove(id) {
                unit.set_location(None);
                let side = if attacker_roster.members.contains(id) {
                    Side::Attacker
                } else {
                    Side::Defender
                };
                fallen.push((side, unit));
            }
        }

        let defender = rebuild_squad(&defender_roster, &mut units)?;
        let attacker = rebuild_squad(&attacker_roster, &mut units)?;
        Ok(Released {
            defender,
            attacker,
            fallen,
        })
    }

    fn living(&self, id: UnitId) -> Result<&Unit, BattlefieldError> {
        let unit = self.unit(id).ok_or(BattlefieldError::UnknownUnit(id))?;
        if self.is_buried(id) {
            return Err(BattlefieldError::Buried(id));
        }
        Ok(unit)
    }

    fn check_footprint(&self, id: UnitId, footprint: &[Hex]) -> Result<(), BattlefieldError> {
        for &hex in footprint {
            let tile = self
                .grid
                .tile(hex)
                .ok_or(BattlefieldError::OutOfBounds(hex))?;
            if matches!(tile.occupant(), Some(other) if other != id) {
                return Err(BattlefieldError::Occupied(hex));
            }
        }
        Ok(())
    }

    fn occupy(&mut self, id: UnitId, previous: &[Hex], next: &[Hex]) {
        for &hex in previous {
            if let Some(tile) = self.grid.tile_mut(hex) {
                tile.set_occupant(None);
            }
        }
        for &hex in next {
            if let Some(tile) = self.grid.tile_mut(hex) {
                tile.set_occupant(Some(id));
            }
        }
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_location(next.first().copied());
        }
    }

    fn in_reach(&self, src: Hex, target: Hex, weapon_type: WeaponType) -> bool {
        let reach = weapon_type.reach();
        let outer = self.grid.range(src, *reach.end());
        let inner = self.grid.range(src, reach.start().saturating_sub(1));
        outer.contains(&target) && !inner.contains(&target)
    }

    #[cfg(feature = "debug-validation")]
    fn validate(&self) {
        for (hex, occupant) in self.grid.occupied() {
            debug_assert!(!self.is_buried(occupant), "buried unit {occupant} still on grid");
            debug_assert!(
                self.units
                    .get(&occupant)
                    .is_some_and(|u| u.occupied_tiles().contains(&hex)),
                "tile {hex} claims unit {occupant} that is elsewhere"
            );
        }
        for id in &self.graveyard {
            debug_assert!(!self.damage_queue.contains_key(id));
        }
    }

    #[cfg(not(feature = "debug-validation"))]
    fn validate(&self) {}
}

/// Per-element damage formula.
///
/// Physical: `(a.p + a.patk + 2a[e] + w[e]) - (d.p + d.pdef + 2d[e] + t[e])`,
/// clamped at zero and summed over the elements; magical uses `m`, `matk`
/// and `mdef`. A magical attack on a defender of the attacker's own element
/// heals by the same amount.
#[must_use]
pub fn elemental_damage(atkr: &Unit, profile: &AttackProfile, defdr: &Unit, terrain: &Composition) -> i32 {
    let a = atkr.stats();
    let d = defdr.stats();
    let kind = profile.weapon_type.kind();
    let (a_base, a_atk, d_base, d_def) = match kind {
        AttackKind::Physical => (a.p, a.patk, d.p, d.pdef),
        AttackKind::Magical => (a.m, a.matk, d.m, d.mdef),
    };

    let total: i32 = ELEMENTS
        .iter()
        .map(|&e| {
            let offense = a_base + a_atk + 2 * i32::from(atkr.comp()[e]) + i32::from(profile.comp[e]);
            let defense = d_base + d_def + 2 * i32::from(defdr.comp()[e]) + i32::from(terrain[e]);
            (offense - defense).max(0)
        })
        .sum();

    if kind == AttackKind::Magical && atkr.element() == defdr.element() {
        -total
    } else {
        total
    }
}

fn enlist(squad: Squad, units: &mut BTreeMap<UnitId, Unit>) -> Result<SquadRoster, BattlefieldError> {
    let mut roster = SquadRoster {
        id: squad.id(),
        name: squad.name().to_string(),
        owner: squad.owner(),
        capacity: squad.capacity(),
        members: Vec::with_capacity(squad.len()),
    };
    for mut unit in squad.into_units() {
        let id = unit.id();
        unit.set_location(None);
        if units.insert(id, unit).is_some() {
            return Err(BattlefieldError::DuplicateUnit(id));
        }
        roster.members.push(id);
    }
    Ok(roster)
}

fn rebuild_squad(
    roster: &SquadRoster,
    units: &mut BTreeMap<UnitId, Unit>,
) -> Result<Squad, SquadError> {
    let mut squad = Squad::with_capacity(roster.id, roster.name.clone(), roster.owner, roster.capacity);
    for id in &roster.members {
        if let Some(mut unit) = units.remove(id) {
            unit.set_location(None);
            squad.append(unit)?;
        }
    }
    Ok(squad)
}
