//! Hexagonal tile grid and its area queries.
//!
//! A grid of radius R holds every hex within R steps of the origin,
//! `6 * triangular(R) + 1` tiles in total. All geometric queries are pure
//! functions of the coordinates and the radius; they clip to the grid and
//! return empty sets for off-grid origins instead of failing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::hex::{Direction, Hex};
use crate::math::triangular;
use crate::stone::Elemental;
use crate::units::UnitId;

/// Which neighbors [`Grid::adjacent`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// All six neighbors.
    All,
    /// Only the neighbor in one direction.
    Toward(Direction),
}

/// One hex of the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    location: Hex,
    comp: Composition,
    occupant: Option<UnitId>,
}

impl Tile {
    /// Create an empty tile.
    #[must_use]
    pub const fn new(location: Hex, comp: Composition) -> Self {
        Self {
            location,
            comp,
            occupant: None,
        }
    }

    /// Tile location.
    #[must_use]
    pub const fn location(&self) -> Hex {
        self.location
    }

    /// Terrain composition.
    #[must_use]
    pub const fn comp(&self) -> Composition {
        self.comp
    }

    /// Unit standing on this tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// True when nothing stands on this tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<UnitId>) {
        self.occupant = occupant;
    }
}

impl Elemental for Tile {
    fn composition(&self) -> &Composition {
        &self.comp
    }
}

/// A finite hexagonal region of tiles centered on the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    radius: u32,
    tiles: BTreeMap<Hex, Tile>,
}

impl Grid {
    /// Number of tiles in a grid of `radius`.
    #[must_use]
    pub const fn tile_count(radius: u32) -> usize {
        (6 * triangular(radius) + 1) as usize
    }

    /// Create a grid with barren terrain.
    #[must_use]
    pub fn new(radius: u32) -> Self {
        Self::with_terrain(radius, |_| Composition::ZERO)
    }

    /// Create a grid whose terrain is computed per hex.
    #[must_use]
    pub fn with_terrain(radius: u32, mut terrain: impl FnMut(Hex) -> Composition) -> Self {
        let r = radius as i32;
        let mut tiles = BTreeMap::new();
        for q in -r..=r {
            let r_min = (-r).max(-q - r);
            let r_max = r.min(-q + r);
            for row in r_min..=r_max {
                let hex = Hex::new(q, row);
                tiles.insert(hex, Tile::new(hex, terrain(hex)));
            }
        }
        Self { radius, tiles }
    }

    /// Grid radius.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// A grid always holds at least the origin tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// True when `hex` lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, hex: Hex) -> bool {
        hex.length() <= self.radius
    }

    /// Tile at `hex`.
    #[must_use]
    pub fn tile(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub(crate) fn tile_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        self.tiles.get_mut(&hex)
    }

    /// Iterate tiles in coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Occupied tiles as `(location, occupant)` in coordinate order.
    pub fn occupied(&self) -> impl Iterator<Item = (Hex, UnitId)> + '_ {
        self.tiles
            .values()
            .filter_map(|t| t.occupant.map(|id| (t.location, id)))
    }

    /// Neighbors of `hex`, clipped to the grid.
    #[must_use]
    pub fn adjacent(&self, hex: Hex, which: Adjacency) -> BTreeSet<Hex> {
        if !self.in_bounds(hex) {
            return BTreeSet::new();
        }
        let candidates: Vec<Hex> = match which {
            Adjacency::All => hex.neighbors().to_vec(),
            Adjacency::Toward(direction) => vec![hex.neighbor(direction)],
        };
        candidates
            .into_iter()
            .filter(|&h| self.in_bounds(h))
            .collect()
    }

    /// Every hex reachable in at most `distance` steps, excluding `origin`.
    ///
    /// Expands ring by ring over in-bounds neighbors.
    #[must_use]
    pub fn range(&self, origin: Hex, distance: u32) -> BTreeSet<Hex> {
        self.expand(origin, distance, &Direction::ALL)
    }

    /// Directional cone from `origin`, excluding `origin`.
    ///
    /// Each step moves along `direction` or its clockwise neighbor, so ring
    /// `k` of the cone holds `k + 1` hexes.
    #[must_use]
    pub fn triangle(&self, origin: Hex, distance: u32, direction: Direction) -> BTreeSet<Hex> {
        self.expand(origin, distance, &[direction, direction.rotate(1)])
    }

    /// Directions whose cone from `src` contains `dst`, with the distance.
    ///
    /// Hexes on a cone edge are listed under both neighboring directions.
    /// An off-grid `src` yields an empty map.
    #[must_use]
    pub fn distance_by_direction(&self, src: Hex, dst: Hex) -> BTreeMap<Direction, u32> {
        let mut out = BTreeMap::new();
        if !self.in_bounds(src) {
            return out;
        }
        let offset = dst - src;
        let distance = offset.length();
        if distance == 0 {
            return out;
        }
        for direction in Direction::ALL {
            if in_cone(offset, distance, direction) {
                out.insert(direction, distance);
            }
        }
        out
    }

    fn expand(&self, origin: Hex, distance: u32, steps: &[Direction]) -> BTreeSet<Hex> {
        let mut found = BTreeSet::new();
        if distance == 0 || !self.in_bounds(origin) {
            return found;
        }

        let mut frontier = vec![origin];
        for _ in 0..distance {
            let mut next = Vec::new();
            for hex in frontier {
                for &step in steps {
                    let candidate = hex.neighbor(step);
                    if candidate != origin && self.in_bounds(candidate) && found.insert(candidate) {
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        found
    }
}

/// True when `offset` = `a * dir + b * dir.rotate(1)` with `a, b >= 0`.
// `offset == a * primary + (n - a) * secondary` for some `a` in `0..=n`.
// Neighboring directions differ by a unit step, so `a` falls out of one axis.
fn in_cone(offset: Hex, distance: u32, direction: Direction) -> bool {
    let primary = direction.offset();
    let secondary = direction.rotate(1).offset();
    let n = i64::from(distance);
    let base_q = i64::from(offset.q) - n * i64::from(secondary.q);
    let base_r = i64::from(offset.r) - n * i64::from(secondary.r);
    let diff_q = i64::from(primary.q - secondary.q);
    let diff_r = i64::from(primary.r - secondary.r);
    let a = if diff_q == 0 { base_r * diff_r } else { base_q * diff_q };
    (0..=n).contains(&a) && base_q == a * diff_q && base_r == a * diff_r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_count() {
        for radius in 0..6 {
            let grid = Grid::new(radius);
            assert_eq!(grid.len(), Grid::tile_count(radius));
        }
        assert_eq!(Grid::tile_count(1), 7);
        assert_eq!(Grid::tile_count(2), 19);
    }

    #[test]
    fn test_in_bounds() {
        let grid = Grid::new(3);
        assert!(grid.in_bounds(Hex::new(3, -3)));
        assert!(grid.in_bounds(Hex::new(-3, 0)));
        assert!(!grid.in_bounds(Hex::new(3, 1)));
        assert!(!grid.in_bounds(Hex::new(4, 0)));
        assert!(!grid.in_bounds(Hex::new(i32::MIN, 0)));
        assert!(!grid.in_bounds(Hex::new(i32::MAX, i32::MAX)));
        assert!(grid.range(Hex::new(i32::MIN, i32::MAX), 2).is_empty());
        assert!(grid
            .distance_by_direction(Hex::new(i32::MIN, 0), Hex::new(i32::MAX, 0))
            .is_empty());
        let far = grid.distance_by_direction(Hex::ORIGIN, Hex::new(i32::MAX, 0));
        assert_eq!(far.keys().copied().collect::<Vec<_>>(), vec![Direction::NorthEast, Direction::SouthEast]);
    }

    #[test]
    fn test_adjacent_clips_to_bounds() {
        let grid = Grid::new(2);
        assert_eq!(grid.adjacent(Hex::ORIGIN, Adjacency::All).len(), 6);
        // a corner has three on-grid neighbors
        assert_eq!(grid.adjacent(Hex::new(2, 0), Adjacency::All).len(), 3);
        assert!(grid
            .adjacent(Hex::new(2, 0), Adjacency::Toward(Direction::SouthEast))
            .is_empty());
        assert_eq!(
            grid.adjacent(Hex::ORIGIN, Adjacency::Toward(Direction::South)),
            BTreeSet::from([Hex::new(0, 1)])
        );
        assert!(grid.adjacent(Hex::new(5, 0), Adjacency::All).is_empty());
    }

    #[test]
    fn test_range_matches_distance() {
        let grid = Grid::new(5);
        let origin = Hex::new(1, -1);
        let range = grid.range(origin, 2);
        assert_eq!(range.len(), 18);
        for hex in &range {
            let d = origin.distance(*hex);
            assert!((1..=2).contains(&d));
        }
        assert!(!range.contains(&origin));
    }

    #[test]
    fn test_range_edge_cases_are_empty() {
        let grid = Grid::new(3);
        assert!(grid.range(Hex::ORIGIN, 0).is_empty());
        assert!(grid.range(Hex::new(10, 10), 3).is_empty());
    }

    #[test]
    fn test_range_clips_at_edge() {
        let grid = Grid::new(2);
        let range = grid.range(Hex::new(2, 0), 1);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn test_triangle_rings_grow() {
        let grid = Grid::new(8);
        let cone = grid.triangle(Hex::ORIGIN, 3, Direction::North);
        // rings of 2, 3 and 4 hexes
        assert_eq!(cone.len(), 9);
        assert!(cone.contains(&Hex::new(0, -1)));
        assert!(cone.contains(&Hex::new(1, -1)));
        assert!(!cone.contains(&Hex::new(0, 1)));
        assert!(grid.triangle(Hex::ORIGIN, 0, Direction::North).is_empty());
    }

    #[test]
    fn test_distance_by_direction() {
        let grid = Grid::new(5);
        let inside = grid.distance_by_direction(Hex::ORIGIN, Hex::new(1, -2));
        assert_eq!(inside, BTreeMap::from([(Direction::North, 2)]));

        // on the North axis, shared by the NorthWest and North cones
        let edge = grid.distance_by_direction(Hex::ORIGIN, Hex::new(0, -3));
        assert_eq!(
            edge,
            BTreeMap::from([(Direction::North, 3), (Direction::NorthWest, 3)])
        );

        assert!(grid
            .distance_by_direction(Hex::new(1, 1), Hex::new(1, 1))
            .is_empty());
    }

    #[test]
    fn test_triangle_agrees_with_distance_by_direction() {
        let grid = Grid::new(6);
        let origin = Hex::new(-1, 1);
        for direction in Direction::ALL {
            for hex in grid.triangle(origin, 3, direction) {
                let dirs = grid.distance_by_direction(origin, hex);
                assert!(dirs.contains_key(&direction));
            }
        }
    }
}
