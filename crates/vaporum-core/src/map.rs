//! Battle map: tiles, hover focus and spatial queries.

use crate::definitions::{ConfigError, Definitions, MapDefinition, TileDefinition, WorldBounds};
use crate::distance_field::DistanceField;
use crate::hex::{is_point_inside_hex, HexCoord, HexGrid, HEX_RADIUS};
use glam::{Vec2, Vec3};
use std::sync::Arc;

/// A single tile on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub definition: Arc<TileDefinition>,
    pub is_hovered: bool,
}

impl Tile {
    pub fn new(definition: Arc<TileDefinition>) -> Self {
        Self {
            definition,
            is_hovered: false,
        }
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.definition.is_blocked
    }
}

/// The tile layer of a running match.
#[derive(Clone, Debug)]
pub struct TileGrid {
    name: String,
    grid: HexGrid,
    world_bounds: WorldBounds,
    tiles: Vec<Tile>,
    focused: Option<HexCoord>,
}

impl TileGrid {
    /// Build tiles from a validated map definition.
    pub fn from_definition(map: &MapDefinition, defs: &Definitions) -> Result<Self, ConfigError> {
        let tiles = map
            .tile_symbols()
            .iter()
            .map(|symbol| {
                defs.tile_by_symbol(*symbol)
                    .cloned()
                    .map(Tile::new)
                    .ok_or_else(|| ConfigError::UnknownTileSymbol {
                        map: map.name.clone(),
                        symbol: *symbol,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: map.name.clone(),
            grid: map.grid,
            world_bounds: map.world_bounds,
            tiles,
            focused: None,
        })
    }

    /// A map of identical tiles whose world bounds enclose every tile.
    pub fn filled(width: u32, height: u32, definition: Arc<TileDefinition>) -> Self {
        let grid = HexGrid::new(width, height);
        let tiles = vec![Tile::new(definition); grid.tile_count()];
        let (min, max) = grid.coords().map(|c| c.world_position()).fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(p), max.max(p)),
        );
        let pad = Vec3::new(HEX_RADIUS, HEX_RADIUS, 1.0);

        Self {
            name: format!("Filled{width}x{height}"),
            grid,
            world_bounds: WorldBounds {
                min: min - pad,
                max: max + pad,
            },
            tiles,
            focused: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> HexGrid {
        self.grid
    }

    pub fn world_bounds(&self) -> WorldBounds {
        self.world_bounds
    }

    /// Get a tile at the given coordinate.
    pub fn get(&self, coord: HexCoord) -> Option<&Tile> {
        self.grid.checked_index(coord).map(|i| &self.tiles[i])
    }

    /// Replace the definition of one tile.
    pub fn set_definition(&mut self, coord: HexCoord, definition: Arc<TileDefinition>) {
        if let Some(i) = self.grid.checked_index(coord) {
            self.tiles[i].definition = definition;
        }
    }

    #[inline]
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        self.grid.in_bounds(coord)
    }

    /// Out-of-bounds coordinates count as blocked.
    pub fn is_blocked(&self, coord: HexCoord) -> bool {
        self.get(coord).map_or(true, Tile::is_blocked)
    }

    /// Whether the tile center lies inside the playable world bounds.
    pub fn is_in_world_bounds(&self, coord: HexCoord) -> bool {
        self.in_bounds(coord) && self.world_bounds.contains_xy(coord.world_position())
    }

    /// Hover `coord`, clearing every other hover flag.
    ///
    /// Returns false (and changes nothing) for out-of-bounds coordinates.
    pub fn set_focus(&mut self, coord: HexCoord) -> bool {
        let Some(index) = self.grid.checked_index(coord) else {
            return false;
        };
        for tile in &mut self.tiles {
            tile.is_hovered = false;
        }
        self.tiles[index].is_hovered = true;
        self.focused = Some(coord);
        true
    }

    /// The hovered tile, if any.
    pub fn focused(&self) -> Option<HexCoord> {
        self.focused
    }

    /// Flood-fill distances to `goal` over unblocked tiles.
    pub fn distance_field(&self, goal: HexCoord) -> DistanceField {
        DistanceField::compute(self.grid, goal, |c| self.is_blocked(c))
    }

    /// The playable tile containing a ground-plane point.
    pub fn hex_at_world(&self, point: Vec2) -> Option<HexCoord> {
        self.grid.coords().find(|c| {
            self.is_in_world_bounds(*c)
                && is_point_inside_hex(point, c.world_position().truncate(), HEX_RADIUS)
        })
    }

    /// Iterate coordinates with their tiles in index order.
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (self.grid.coord_from_index(i), tile))
    }
}
