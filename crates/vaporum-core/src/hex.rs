//! Hex coordinate system for the battle map.
//!
//! Tiles are addressed with axial coordinates `(col, row)` laid out on the
//! ground plane by a fixed linear transform: each column step moves along
//! [`I_BASIS`], each row step along [`J_BASIS`]. Adjacent tile centers are
//! exactly one world unit apart, so the circumradius of a tile is `1/√3`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// World-space step for one column.
pub const I_BASIS: Vec2 = Vec2::new(0.866, 0.5);
/// World-space step for one row.
pub const J_BASIS: Vec2 = Vec2::new(0.0, 1.0);
/// Circumradius of a single hex tile.
pub const HEX_RADIUS: f32 = 0.577_350_26;

/// Axial offsets of the six neighbors, in enumeration order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)];

/// Axial coordinate of a single hex tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column coordinate
    pub col: i32,
    /// Row coordinate
    pub row: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major, matching tile index order
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl HexCoord {
    /// Create a new hex coordinate.
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// All 6 neighbors in the fixed enumeration order.
    ///
    /// The result is not bounds-checked; callers filter against their grid.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        NEIGHBOR_OFFSETS.map(|(dc, dr)| HexCoord::new(self.col + dc, self.row + dr))
    }

    /// Number of adjacent-hex steps to another tile.
    ///
    /// For axial differences `|dx| + |dx + dy| + |dy|` is always even, so the
    /// integer halving is exact.
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let dx = other.col - self.col;
        let dy = other.row - self.row;
        ((dx.abs() + (dx + dy).abs() + dy.abs()) / 2) as u32
    }

    /// World-space center of this tile on the ground plane (z = 0).
    pub fn world_position(&self) -> Vec3 {
        let xy = I_BASIS * self.col as f32 + J_BASIS * self.row as f32;
        xy.extend(0.0)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Error parsing a `"c,r"` coordinate string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex coordinate '{0}', expected \"col,row\"")]
pub struct ParseHexCoordError(pub String);

impl FromStr for HexCoord {
    type Err = ParseHexCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHexCoordError(s.to_string());
        let (col, row) = s.split_once(',').ok_or_else(err)?;
        let col = col.trim().parse().map_err(|_| err())?;
        let row = row.trim().parse().map_err(|_| err())?;
        Ok(HexCoord::new(col, row))
    }
}

impl HexCoord {
    /// Text form used by the command protocol: `"c,r"`.
    pub fn to_command_string(&self) -> String {
        format!("{},{}", self.col, self.row)
    }
}

/// Rectangular hex grid dimensions and index mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    pub width: u32,
    pub height: u32,
}

impl HexGrid {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of tiles.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Coordinate of the tile stored at `index` (row-major).
    pub fn coord_from_index(&self, index: usize) -> HexCoord {
        let width = self.width.max(1) as usize;
        HexCoord::new((index % width) as i32, (index / width) as i32)
    }

    /// Row-major index of `coord`. Not bounds-checked.
    pub fn index_from_coord(&self, coord: HexCoord) -> usize {
        (self.width as i64 * coord.row as i64 + coord.col as i64) as usize
    }

    /// Index of `coord`, or `None` if it lies outside the grid.
    pub fn checked_index(&self, coord: HexCoord) -> Option<usize> {
        self.in_bounds(coord).then(|| self.index_from_coord(coord))
    }

    /// Check if this coordinate is within the grid.
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && (coord.col as u32) < self.width
            && (coord.row as u32) < self.height
    }

    /// In-bounds neighbors of `coord`, preserving enumeration order.
    pub fn neighbors_in_bounds(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        coord.neighbors().into_iter().filter(|c| self.in_bounds(*c))
    }

    /// Iterate all coordinates in index order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.tile_count()).map(|i| self.coord_from_index(i))
    }
}

/// Whether `point` lies strictly left of the directed line `start -> end`.
pub fn is_point_left_of_line(point: Vec2, start: Vec2, end: Vec2) -> bool {
    let perpendicular = (end - start).perp();
    (point - start).dot(perpendicular) > 0.0
}

/// Whether `point` lies inside the hex centered at `center`.
///
/// Vertices sit at polar angles 0, 60, ..., 300 degrees; the point must be
/// left of every counter-clockwise edge.
pub fn is_point_inside_hex(point: Vec2, center: Vec2, radius: f32) -> bool {
    let vertices: [Vec2; 6] = std::array::from_fn(|i| {
        let angle = (60.0 * i as f32).to_radians();
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    });
    (0..6).all(|i| is_point_left_of_line(point, vertices[i], vertices[(i + 1) % 6]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_distance_same() {
        let a = HexCoord::new(5, 5);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_hex_distance_adjacent() {
        let center = HexCoord::new(5, 5);
        for neighbor in center.neighbors() {
            assert_eq!(center.distance(&neighbor), 1, "neighbor {neighbor} should be 1 away");
        }
    }

    #[test]
    fn test_hex_distance_examples() {
        let origin = HexCoord::new(0, 0);
        assert_eq!(origin.distance(&HexCoord::new(3, 0)), 3);
        assert_eq!(origin.distance(&HexCoord::new(0, 4)), 4);
        // (1,-1) is a single step, so (2,-2) is two
        assert_eq!(origin.distance(&HexCoord::new(2, -2)), 2);
        // same-sign axes add
        assert_eq!(origin.distance(&HexCoord::new(2, 2)), 4);
    }

    #[test]
    fn test_hex_distance_symmetric() {
        let a = HexCoord::new(1, 7);
        let b = HexCoord::new(6, 2);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn test_neighbor_order() {
        let n = HexCoord::new(0, 0).neighbors();
        assert_eq!(
            n,
            [
                HexCoord::new(0, 1),
                HexCoord::new(1, 0),
                HexCoord::new(1, -1),
                HexCoord::new(0, -1),
                HexCoord::new(-1, 0),
                HexCoord::new(-1, 1),
            ]
        );
    }

    #[test]
    fn test_index_round_trip() {
        let grid = HexGrid::new(7, 4);
        for i in 0..grid.tile_count() {
            assert_eq!(grid.index_from_coord(grid.coord_from_index(i)), i);
        }
        assert_eq!(grid.coord_from_index(9), HexCoord::new(2, 1));
    }

    #[test]
    fn test_in_bounds() {
        let grid = HexGrid::new(3, 2);
        assert!(grid.in_bounds(HexCoord::new(0, 0)));
        assert!(grid.in_bounds(HexCoord::new(2, 1)));
        assert!(!grid.in_bounds(HexCoord::new(3, 0)));
        assert!(!grid.in_bounds(HexCoord::new(0, 2)));
        assert!(!grid.in_bounds(HexCoord::new(-1, 0)));
        assert_eq!(grid.checked_index(HexCoord::new(1, 1)), Some(4));
        assert_eq!(grid.checked_index(HexCoord::new(1, -1)), None);
    }

    #[test]
    fn test_corner_neighbors_filtered() {
        let grid = HexGrid::new(4, 4);
        let n: Vec<_> = grid.neighbors_in_bounds(HexCoord::new(0, 0)).collect();
        assert_eq!(n, vec![HexCoord::new(0, 1), HexCoord::new(1, 0)]);
    }

    #[test]
    fn test_world_position() {
        let p = HexCoord::new(2, 3).world_position();
        assert!((p.x - 1.732).abs() < 1e-4);
        assert!((p.y - 4.0).abs() < 1e-4);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_adjacent_centers_one_unit_apart() {
        let a = HexCoord::new(4, 4);
        for n in a.neighbors() {
            let d = a.world_position().distance(n.world_position());
            assert!((d - 1.0).abs() < 1e-3, "{n} at {d}");
        }
    }

    #[test]
    fn test_parse_and_display() {
        let c: HexCoord = "3,7".parse().unwrap();
        assert_eq!(c, HexCoord::new(3, 7));
        assert_eq!(" -1 , 2 ".parse::<HexCoord>().unwrap(), HexCoord::new(-1, 2));
        assert_eq!(c.to_command_string(), "3,7");
        assert_eq!(c.to_string(), "(3, 7)");
        assert!("3".parse::<HexCoord>().is_err());
        assert!("a,b".parse::<HexCoord>().is_err());
    }

    #[test]
    fn test_point_inside_hex() {
        let center = Vec2::new(1.0, 1.0);
        assert!(is_point_inside_hex(center, center, HEX_RADIUS));
        assert!(is_point_inside_hex(center + Vec2::new(0.4, 0.0), center, HEX_RADIUS));
        assert!(!is_point_inside_hex(center + Vec2::new(0.0, 0.6), center, HEX_RADIUS));
        assert!(!is_point_inside_hex(center + Vec2::new(2.0, 2.0), center, HEX_RADIUS));
    }

    #[test]
    fn test_point_left_of_line() {
        let start = Vec2::ZERO;
        let end = Vec2::X;
        assert!(is_point_left_of_line(Vec2::new(0.5, 1.0), start, end));
        assert!(!is_point_left_of_line(Vec2::new(0.5, -1.0), start, end));
    }
}
