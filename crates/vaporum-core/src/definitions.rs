//! Typed tile, unit and map definitions.
//!
//! All definitions come from a single JSON document with `tiles`, `units`
//! and `maps` arrays. The document is validated once at load time; every
//! later lookup can rely on the invariants checked here (positive defense,
//! consistent grid sizes, every symbol resolvable).
//!
//! Map symbol rows are written north-first, the way a map reads on screen:
//! the first row in the file is the highest row index. [`MapDefinition`]
//! stores symbols in tile index order (`i = width * row + col`).

use crate::hex::{HexCoord, HexGrid};
use crate::types::PlayerId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Symbol marking a tile with no unit in a unit layout.
pub const EMPTY_UNIT_SYMBOL: char = '.';

/// Largest attack value whose doubled damage still fits in an `i32`.
pub const MAX_ATTACK_DAMAGE: i32 = i32::MAX / 2;

/// Errors raised while loading definitions or settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed definitions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error("duplicate {kind} symbol '{symbol}'")]
    DuplicateSymbol { kind: &'static str, symbol: char },
    #[error("unit '{name}': {reason}")]
    InvalidUnit { name: String, reason: String },
    #[error("map '{map}': {reason}")]
    InvalidMap { map: String, reason: String },
    #[error("map '{map}': unknown tile symbol '{symbol}'")]
    UnknownTileSymbol { map: String, symbol: char },
    #[error("map '{map}': unknown unit symbol '{symbol}'")]
    UnknownUnitSymbol { map: String, symbol: char },
    #[error("map '{map}': no unit layout for player {player}")]
    MissingPlayerLayout { map: String, player: PlayerId },
    #[error("unknown map '{0}'")]
    UnknownMap(String),
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}

/// Terrain type for a single tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub name: String,
    pub symbol: char,
    #[serde(default)]
    pub is_blocked: bool,
}

/// Unit archetype. Only moved Artillery gains attack immunity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Tank,
    Artillery,
}

/// Inclusive hex-distance window for attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRange {
    pub min: u32,
    pub max: u32,
}

impl AttackRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Check if a distance falls inside the window.
    #[inline]
    pub fn contains(&self, distance: u32) -> bool {
        self.min <= distance && distance <= self.max
    }
}

/// Opaque asset handles resolved by the presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitAssets {
    pub image: String,
    pub model: String,
    pub hit_sound: String,
    pub fire_sound: String,
    pub death_sound: String,
}

/// Stat block for one unit type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: String,
    pub symbol: char,
    pub unit_type: UnitType,
    pub attack_damage: i32,
    pub attack_range: AttackRange,
    pub movement_range: u32,
    pub defense: i32,
    pub max_health: i32,
    /// Muzzle position in the unit's local frame (forward, left, up).
    #[serde(default)]
    pub muzzle_offset: Vec3,
    #[serde(default)]
    pub assets: UnitAssets,
}

impl UnitDefinition {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUnit {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.symbol == EMPTY_UNIT_SYMBOL {
            return Err(invalid("symbol '.' is reserved for empty tiles"));
        }
        if self.defense <= 0 {
            return Err(invalid("defense must be positive"));
        }
        if self.max_health <= 0 {
            return Err(invalid("max_health must be positive"));
        }
        if self.attack_damage < 0 {
            return Err(invalid("attack_damage must not be negative"));
        }
        if self.attack_damage > MAX_ATTACK_DAMAGE {
            return Err(invalid("attack_damage is too large"));
        }
        if self.attack_range.min > self.attack_range.max {
            return Err(invalid("attack_range.min exceeds attack_range.max"));
        }
        Ok(())
    }
}

/// Axis-aligned world bounds of the playable area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBounds {
    /// Whether a ground-plane point lies inside the bounds (XY only).
    pub fn contains_xy(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Validated map layout, symbols stored in tile index order.
#[derive(Clone, Debug, PartialEq)]
pub struct MapDefinition {
    pub name: String,
    pub grid: HexGrid,
    pub world_bounds: WorldBounds,
    tile_symbols: Vec<char>,
    unit_symbols: [Vec<char>; 2],
}

impl MapDefinition {
    /// Tile symbol at `coord`, `None` outside the grid.
    pub fn tile_symbol(&self, coord: HexCoord) -> Option<char> {
        self.grid.checked_index(coord).map(|i| self.tile_symbols[i])
    }

    /// Tile symbols in index order.
    pub fn tile_symbols(&self) -> &[char] {
        &self.tile_symbols
    }

    /// Unit symbols for one player in index order.
    pub fn unit_symbols(&self, player: PlayerId) -> &[char] {
        &self.unit_symbols[player.index()]
    }
}

#[derive(Deserialize)]
struct RawUnitLayout {
    /// 1-based player number as written in the file.
    player: u8,
    rows: Vec<String>,
}

#[derive(Deserialize)]
struct RawMapDefinition {
    name: String,
    dimensions: (u32, u32),
    world_bounds: WorldBounds,
    tiles: Vec<String>,
    units: Vec<RawUnitLayout>,
}

#[derive(Deserialize)]
struct RawDefinitions {
    tiles: Vec<TileDefinition>,
    units: Vec<UnitDefinition>,
    maps: Vec<RawMapDefinition>,
}

/// Registry of all definitions, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    tiles: BTreeMap<String, Arc<TileDefinition>>,
    units: BTreeMap<String, Arc<UnitDefinition>>,
    maps: BTreeMap<String, Arc<MapDefinition>>,
}

impl Definitions {
    /// Parse and validate a definitions document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawDefinitions = serde_json::from_str(json)?;
        let mut defs = Definitions::default();

        let mut tile_symbols = HashSet::new();
        for tile in raw.tiles {
            if !tile_symbols.insert(tile.symbol) {
                return Err(ConfigError::DuplicateSymbol {
                    kind: "tile",
                    symbol: tile.symbol,
                });
            }
            insert_unique(&mut defs.tiles, "tile", tile.name.clone(), tile)?;
        }

        let mut unit_symbols = HashSet::new();
        for unit in raw.units {
            unit.validate()?;
            if !unit_symbols.insert(unit.symbol) {
                return Err(ConfigError::DuplicateSymbol {
                    kind: "unit",
                    symbol: unit.symbol,
                });
            }
            insert_unique(&mut defs.units, "unit", unit.name.clone(), unit)?;
        }

        for raw_map in raw.maps {
            let map = defs.build_map(raw_map)?;
            insert_unique(&mut defs.maps, "map", map.name.clone(), map)?;
        }

        tracing::debug!(
            tiles = defs.tiles.len(),
            units = defs.units.len(),
            maps = defs.maps.len(),
            "Loaded definitions"
        );
        Ok(defs)
    }

    /// Read and validate a definitions file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The definitions shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(include_str!("../data/definitions.json"))
    }

    pub fn tile(&self, name: &str) -> Option<&Arc<TileDefinition>> {
        self.tiles.get(name)
    }

    pub fn unit(&self, name: &str) -> Option<&Arc<UnitDefinition>> {
        self.units.get(name)
    }

    pub fn map(&self, name: &str) -> Option<&Arc<MapDefinition>> {
        self.maps.get(name)
    }

    /// Look up a map, failing with [`ConfigError::UnknownMap`].
    pub fn require_map(&self, name: &str) -> Result<&Arc<MapDefinition>, ConfigError> {
        self.map(name)
            .ok_or_else(|| ConfigError::UnknownMap(name.to_string()))
    }

    pub fn tile_by_symbol(&self, symbol: char) -> Option<&Arc<TileDefinition>> {
        self.tiles.values().find(|t| t.symbol == symbol)
    }

    pub fn unit_by_symbol(&self, symbol: char) -> Option<&Arc<UnitDefinition>> {
        self.units.values().find(|u| u.symbol == symbol)
    }

    /// Map names in sorted order.
    pub fn map_names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    fn build_map(&self, raw: RawMapDefinition) -> Result<MapDefinition, ConfigError> {
        let name = raw.name;
        let (width, height) = raw.dimensions;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidMap {
                map: name,
                reason: "dimensions must be non-zero".to_string(),
            });
        }
        let grid = HexGrid::new(width, height);

        let tile_symbols = flip_rows(&name, grid, &raw.tiles)?;
        if let Some(symbol) = tile_symbols
            .iter()
            .copied()
            .find(|s| self.tile_by_symbol(*s).is_none())
        {
            return Err(ConfigError::UnknownTileSymbol { map: name, symbol });
        }

        let mut layouts: [Option<Vec<char>>; 2] = [None, None];
        for layout in &raw.units {
            let slot = match layout.player {
                1 | 2 => (layout.player - 1) as usize,
                other => {
                    return Err(ConfigError::InvalidMap {
                        map: name,
                        reason: format!("unit layout for unknown player {other}"),
                    })
                }
            };
            let symbols = flip_rows(&name, grid, &layout.rows)?;
            if let Some(symbol) = symbols
                .iter()
                .copied()
                .find(|s| *s != EMPTY_UNIT_SYMBOL && self.unit_by_symbol(*s).is_none())
            {
                return Err(ConfigError::UnknownUnitSymbol { map: name, symbol });
            }
            layouts[slot] = Some(symbols);
        }

        let [first, second] = layouts;
        let first = first.ok_or_else(|| ConfigError::MissingPlayerLayout {
            map: name.clone(),
            player: PlayerId::One,
        })?;
        let second = second.ok_or_else(|| ConfigError::MissingPlayerLayout {
            map: name.clone(),
            player: PlayerId::Two,
        })?;

        Ok(MapDefinition {
            name,
            grid,
            world_bounds: raw.world_bounds,
            tile_symbols,
            unit_symbols: [first, second],
        })
    }
}

fn insert_unique<T>(
    registry: &mut BTreeMap<String, Arc<T>>,
    kind: &'static str,
    name: String,
    value: T,
) -> Result<(), ConfigError> {
    if registry.contains_key(&name) {
        return Err(ConfigError::DuplicateName { kind, name });
    }
    registry.insert(name, Arc::new(value));
    Ok(())
}

/// Convert north-first symbol rows into index order, ignoring whitespace.
fn flip_rows(map: &str, grid: HexGrid, rows: &[String]) -> Result<Vec<char>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidMap {
        map: map.to_string(),
        reason,
    };

    if rows.len() != grid.height as usize {
        return Err(invalid(format!(
            "expected {} rows, found {}",
            grid.height,
            rows.len()
        )));
    }

    let mut symbols = Vec::with_capacity(grid.tile_count());
    for (offset, row) in rows.iter().rev().enumerate() {
        let row_symbols: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
        if row_symbols.len() != grid.width as usize {
            return Err(invalid(format!(
                "row {} has {} symbols, expected {}",
                offset,
                row_symbols.len(),
                grid.width
            )));
        }
        symbols.extend(row_symbols);
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_DEFS: &str = r#"{
        "tiles": [
            { "name": "Plain", "symbol": "-" },
            { "name": "Rock", "symbol": "X", "is_blocked": true }
        ],
        "units": [
            { "name": "Tank", "symbol": "T", "unit_type": "Tank", "attack_damage": 10,
              "attack_range": { "min": 1, "max": 2 }, "movement_range": 3,
              "defense": 5, "max_health": 10 }
        ],
        "maps": [
            { "name": "Tiny", "dimensions": [3, 2],
              "world_bounds": { "min": [0, 0, 0], "max": [10, 10, 1] },
              "tiles": ["X - -", "- - -"],
              "units": [
                { "player": 1, "rows": ["...", "T.."] },
                { "player": 2, "rows": ["..T", "..."] }
              ] }
        ]
    }"#;

    #[test]
    fn test_load_small_definitions() {
        let defs = Definitions::from_json(SMALL_DEFS).unwrap();
        assert!(defs.tile("Plain").is_some());
        assert!(defs.tile_by_symbol('X').unwrap().is_blocked);
        assert_eq!(defs.unit("Tank").unwrap().defense, 5);
        assert_eq!(defs.map_names().collect::<Vec<_>>(), vec!["Tiny"]);
    }

    #[test]
    fn test_rows_flipped_north_first() {
        let defs = Definitions::from_json(SMALL_DEFS).unwrap();
        let map = defs.map("Tiny").unwrap();
        // Top row in the file is row 1
        assert_eq!(map.tile_symbol(HexCoord::new(0, 1)), Some('X'));
        assert_eq!(map.tile_symbol(HexCoord::new(0, 0)), Some('-'));
        assert_eq!(map.unit_symbols(PlayerId::One)[0], 'T');
        assert_eq!(map.unit_symbols(PlayerId::Two)[5], 'T');
    }

    #[test]
    fn test_reject_zero_defense() {
        let json = SMALL_DEFS.replace("\"defense\": 5", "\"defense\": 0");
        let err = Definitions::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUnit { .. }));
        assert!(err.to_string().contains("defense"));
    }

    #[test]
    fn test_reject_oversized_attack() {
        let json = SMALL_DEFS.replace("\"attack_damage\": 10", "\"attack_damage\": 2000000000");
        let err = Definitions::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("attack_damage"));
    }

    #[test]
    fn test_reject_inverted_range() {
        let json = SMALL_DEFS.replace("\"min\": 1, \"max\": 2", "\"min\": 3, \"max\": 2");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn test_reject_unknown_tile_symbol() {
        let json = SMALL_DEFS.replace("\"X - -\"", "\"Q - -\"");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::UnknownTileSymbol { symbol: 'Q', .. })
        ));
    }

    #[test]
    fn test_reject_unknown_unit_symbol() {
        let json = SMALL_DEFS.replace("\"..T\"", "\"..Z\"");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::UnknownUnitSymbol { symbol: 'Z', .. })
        ));
    }

    #[test]
    fn test_reject_wrong_row_length() {
        let json = SMALL_DEFS.replace("\"- - -\"", "\"- -\"");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::InvalidMap { .. })
        ));
    }

    #[test]
    fn test_reject_missing_player_layout() {
        let json = SMALL_DEFS.replace("{ \"player\": 2, \"rows\": [\"..T\", \"...\"] }", "{ \"player\": 1, \"rows\": [\"...\", \"...\"] }");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::MissingPlayerLayout {
                player: PlayerId::Two,
                ..
            })
        ));
    }

    #[test]
    fn test_reject_duplicate_names() {
        let json = SMALL_DEFS.replace("\"name\": \"Rock\"", "\"name\": \"Plain\"");
        assert!(matches!(
            Definitions::from_json(&json),
            Err(ConfigError::DuplicateName { kind: "tile", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Definitions::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Definitions::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_unknown_map_lookup() {
        let defs = Definitions::from_json(SMALL_DEFS).unwrap();
        assert!(matches!(
            defs.require_map("Nowhere"),
            Err(ConfigError::UnknownMap(_))
        ));
    }

    #[test]
    fn test_builtin_definitions() {
        let defs = Definitions::builtin().unwrap();
        let map = defs.require_map("Grid12x12").unwrap();
        assert_eq!(map.grid, HexGrid::new(12, 12));
        assert!(defs.unit("Tank").is_some());
        assert!(defs.unit("Artillery").is_some());
    }

    #[test]
    fn test_attack_range_contains() {
        let range = AttackRange::new(2, 4);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
