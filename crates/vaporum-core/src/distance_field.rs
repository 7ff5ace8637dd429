//! Breadth-first distance fields over the hex grid.
//!
//! A [`DistanceField`] stores, for every tile, the minimum number of hex
//! steps to a goal tile through unblocked tiles. Paths are extracted by
//! greedy descent: from any reached tile, stepping to a strictly smaller
//! neighbor always leads back to the goal.

use crate::hex::{HexCoord, HexGrid};
use std::collections::VecDeque;

/// Value of tiles the flood fill never reached.
pub const UNREACHED: f32 = 9999.0;

/// Errors produced by path extraction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    PathNotFound { from: HexCoord, to: HexCoord },
}

/// Per-tile step counts to a goal tile.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceField {
    grid: HexGrid,
    goal: HexCoord,
    values: Vec<f32>,
}

impl DistanceField {
    /// Flood-fill from `goal` across tiles for which `is_blocked` is false.
    ///
    /// The goal itself always receives 0, even when blocked.
    pub fn compute(grid: HexGrid, goal: HexCoord, is_blocked: impl Fn(HexCoord) -> bool) -> Self {
        let mut values = vec![UNREACHED; grid.tile_count()];
        let mut queue = VecDeque::new();

        if let Some(goal_index) = grid.checked_index(goal) {
            values[goal_index] = 0.0;
            queue.push_back(goal);
        }

        while let Some(current) = queue.pop_front() {
            let current_value = values[grid.index_from_coord(current)];

            for neighbor in grid.neighbors_in_bounds(current) {
                let index = grid.index_from_coord(neighbor);
                if !is_blocked(neighbor) && values[index] > current_value + 1.0 {
                    values[index] = current_value + 1.0;
                    queue.push_back(neighbor);
                }
            }
        }

        Self { grid, goal, values }
    }

    /// The tile this field measures distance to.
    pub fn goal(&self) -> HexCoord {
        self.goal
    }

    pub fn grid(&self) -> HexGrid {
        self.grid
    }

    /// Value at `coord`, [`UNREACHED`] for out-of-bounds tiles.
    pub fn value_at(&self, coord: HexCoord) -> f32 {
        self.grid
            .checked_index(coord)
            .map_or(UNREACHED, |index| self.values[index])
    }

    /// Whether the flood fill reached `coord`.
    pub fn is_reachable(&self, coord: HexCoord) -> bool {
        self.value_at(coord) < UNREACHED
    }

    /// Largest reached value, used to normalize heat-map shading.
    pub fn max_finite_value(&self) -> f32 {
        self.values
            .iter()
            .copied()
            .filter(|v| *v < UNREACHED)
            .fold(0.0, f32::max)
    }

    /// Raw values in tile index order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Descend from `source` to `destination` along strictly decreasing values.
    ///
    /// The returned path starts at `source` and ends at `destination`, both
    /// included. Ties between equally small neighbors go to the first in
    /// neighbor enumeration order. Descent only terminates at the field's
    /// goal, so `destination` is expected to be that goal.
    pub fn extract_path(
        &self,
        source: HexCoord,
        destination: HexCoord,
    ) -> Result<Vec<HexCoord>, PathError> {
        let not_found = PathError::PathNotFound {
            from: source,
            to: destination,
        };

        if !self.grid.in_bounds(source)
            || !self.grid.in_bounds(destination)
            || !self.is_reachable(source)
        {
            return Err(not_found);
        }

        let mut path = vec![source];
        let mut current = source;

        // Every step strictly decreases the value, so the tile count bounds the walk.
        for _ in 0..self.grid.tile_count() {
            if current == destination {
                return Ok(path);
            }

            let mut best_value = self.value_at(current);
            let mut best = None;
            for neighbor in self.grid.neighbors_in_bounds(current) {
                let value = self.value_at(neighbor);
                if value < best_value {
                    best_value = value;
                    best = Some(neighbor);
                }
            }

            match best {
                Some(next) => {
                    current = next;
                    path.push(next);
                }
                None => return Err(not_found),
            }
        }

        if current == destination {
            Ok(path)
        } else {
            Err(not_found)
        }
    }
}
