//! Axial hex coordinates.
//!
//! Hexes use the axial `(q, r)` scheme; the implied third cube coordinate is
//! `s = -q - r`. Distance and rotation go through cube coordinates. A unit
//! that is not on the grid has location `None`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Hex {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

/// Cube coordinate with `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cube {
    /// x axis (equals axial q).
    pub x: i32,
    /// y axis (equals axial -q - r).
    pub y: i32,
    /// z axis (equals axial r).
    pub z: i32,
}

impl Hex {
    /// The grid center.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Create a hex from axial coordinates.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implied third axial coordinate, saturating at the `i32` bounds.
    #[must_use]
    pub const fn s(self) -> i32 {
        self.q.saturating_add(self.r).saturating_neg()
    }

    /// Convert to cube coordinates.
    #[must_use]
    pub const fn to_cube(self) -> Cube {
        Cube {
            x: self.q,
            y: self.s(),
            z: self.r,
        }
    }

    /// Convert from cube coordinates.
    #[must_use]
    pub const fn from_cube(cube: Cube) -> Self {
        Self {
            q: cube.x,
            r: cube.z,
        }
    }

    /// Distance from the origin in hex steps.
    #[must_use]
    pub fn length(self) -> u32 {
        cube_length(i64::from(self.q), i64::from(self.r))
    }

    /// Distance to another hex in hex steps.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        cube_length(
            i64::from(self.q) - i64::from(other.q),
            i64::from(self.r) - i64::from(other.r),
        )
    }

    /// The adjacent hex in `direction`.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// All six adjacent hexes in direction order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Rotate 60° clockwise about the origin.
    #[must_use]
    pub fn rotate_cw(self) -> Self {
        let c = self.to_cube();
        Self::from_cube(Cube {
            x: c.z.saturating_neg(),
            y: c.x.saturating_neg(),
            z: c.y.saturating_neg(),
        })
    }

    /// Rotate 60° counter-clockwise about the origin.
    #[must_use]
    pub fn rotate_ccw(self) -> Self {
        let c = self.to_cube();
        Self::from_cube(Cube {
            x: c.y.saturating_neg(),
            y: c.z.saturating_neg(),
            z: c.x.saturating_neg(),
        })
    }
}

// Widened so coordinates anywhere in `i32` measure without overflow.
fn cube_length(q: i64, r: i64) -> u32 {
    let steps = q.abs().max(r.abs()).max((q + r).abs());
    u32::try_from(steps).unwrap_or(u32::MAX)
}

// Hex arithmetic saturates: far-off coordinates stay far off instead of wrapping.
impl Add for Hex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.q.saturating_add(rhs.q), self.r.saturating_add(rhs.r))
    }
}

impl Sub for Hex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.q.saturating_sub(rhs.q), self.r.saturating_sub(rhs.r))
    }
}

impl Neg for Hex {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(self.q.saturating_neg(), self.r.saturating_neg())
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// The six neighbor directions, clockwise from North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `(0, -1)`
    North,
    /// `(1, -1)`
    NorthEast,
    /// `(1, 0)`
    SouthEast,
    /// `(0, 1)`
    South,
    /// `(-1, 1)`
    SouthWest,
    /// `(-1, 0)`
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Position in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::SouthEast => 2,
            Direction::South => 3,
            Direction::SouthWest => 4,
            Direction::NorthWest => 5,
        }
    }

    /// Unit offset for one step in this direction.
    #[must_use]
    pub const fn offset(self) -> Hex {
        match self {
            Direction::North => Hex::new(0, -1),
            Direction::NorthEast => Hex::new(1, -1),
            Direction::SouthEast => Hex::new(1, 0),
            Direction::South => Hex::new(0, 1),
            Direction::SouthWest => Hex::new(-1, 1),
            Direction::NorthWest => Hex::new(-1, 0),
        }
    }

    /// Rotate by `steps` sixths of a turn clockwise (negative is counter-clockwise).
    #[must_use]
    pub const fn rotate(self, steps: i32) -> Self {
        let index = (self.index() as i32 + steps).rem_euclid(6) as usize;
        Self::ALL[index]
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.rotate(3)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::NorthEast => "Northeast",
            Direction::SouthEast => "Southeast",
            Direction::South => "South",
            Direction::SouthWest => "Southwest",
            Direction::NorthWest => "Northwest",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_round_trip() {
        let hex = Hex::new(3, -5);
        let cube = hex.to_cube();
        assert_eq!(cube.x + cube.y + cube.z, 0);
        assert_eq!(Hex::from_cube(cube), hex);
    }

    #[test]
    fn test_distance() {
        assert_eq!(Hex::ORIGIN.distance(Hex::new(2, -1)), 2);
        assert_eq!(Hex::new(-2, 0).distance(Hex::new(2, 0)), 4);
        assert_eq!(Hex::new(1, 1).distance(Hex::new(1, 1)), 0);
    }

    #[test]
    fn test_neighbors_are_distance_one() {
        let center = Hex::new(4, -2);
        for n in center.neighbors() {
            assert_eq!(center.distance(n), 1);
        }
    }

    #[test]
    fn test_rotation_cycles() {
        let hex = Hex::new(2, -1);
        let mut rotated = hex;
        for _ in 0..6 {
            rotated = rotated.rotate_cw();
            assert_eq!(rotated.length(), hex.length());
        }
        assert_eq!(rotated, hex);
        assert_eq!(hex.rotate_cw().rotate_ccw(), hex);
    }

    #[test]
    fn test_rotate_cw_follows_direction_order() {
        for direction in Direction::ALL {
            assert_eq!(direction.offset().rotate_cw(), direction.rotate(1).offset());
        }
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let far = Hex::new(i32::MIN, 0);
        assert_eq!(far.length(), 1 << 31);
        assert_eq!(Hex::new(i32::MAX, i32::MAX).length(), u32::MAX - 1);
        assert_eq!(far.distance(Hex::new(i32::MAX, 0)), u32::MAX);
        assert_eq!(Hex::new(i32::MAX, 0).neighbor(Direction::SouthEast), Hex::new(i32::MAX, 0));
        assert_eq!(-far, Hex::new(i32::MAX, 0));
    }

    #[test]
    fn test_direction_opposite() {
        for direction in Direction::ALL {
            assert_eq!(direction.offset() + direction.opposite().offset(), Hex::ORIGIN);
        }
    }
}
