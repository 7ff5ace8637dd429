//! Player state: owned units, selection and turn state.

use crate::definitions::{ConfigError, Definitions, MapDefinition, EMPTY_UNIT_SYMBOL};
use crate::hex::HexCoord;
use crate::map::TileGrid;
use crate::types::{PlayerId, UnitId};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Whether a player's actions originate on this machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetState {
    Local,
    Remote,
}

/// Per-player turn state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    WaitingForTurn,
    NoSelection,
    UnitSelectedMove,
    UnitSelectedAttack,
    EndTurn,
}

/// One side of a match. Owns its units exclusively.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub net_state: NetState,
    pub turn_state: TurnState,
    units: Vec<Unit>,
    selected_unit: Option<UnitId>,
}

impl Player {
    /// Create a player with no units, waiting for its turn.
    pub fn new(id: PlayerId, net_state: NetState) -> Self {
        Self {
            id,
            net_state,
            turn_state: TurnState::WaitingForTurn,
            units: Vec::new(),
            selected_unit: None,
        }
    }

    /// Facing for freshly spawned units; the second player faces the first.
    pub fn default_yaw_degrees(&self) -> f32 {
        match self.id {
            PlayerId::One => 0.0,
            PlayerId::Two => 180.0,
        }
    }

    /// Spawn units from the map's layout for this player.
    ///
    /// `next_id` is the match-wide id counter; it is advanced for every unit.
    pub fn spawn_units(
        &mut self,
        map: &MapDefinition,
        defs: &Definitions,
        tiles: &TileGrid,
        next_id: &mut u32,
    ) -> Result<(), ConfigError> {
        let yaw = self.default_yaw_degrees();
        for (index, symbol) in map.unit_symbols(self.id).iter().enumerate() {
            if *symbol == EMPTY_UNIT_SYMBOL {
                continue;
            }
            let definition = defs.unit_by_symbol(*symbol).cloned().ok_or_else(|| {
                ConfigError::UnknownUnitSymbol {
                    map: map.name.clone(),
                    symbol: *symbol,
                }
            })?;
            let coord = map.grid.coord_from_index(index);
            self.add_unit(Unit::new(UnitId(*next_id), self.id, definition, coord, yaw, tiles));
            *next_id += 1;
        }
        Ok(())
    }

    /// Add an already-built unit.
    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// The living unit standing on `coord`. Dead units never match.
    pub fn unit_at(&self, coord: HexCoord) -> Option<&Unit> {
        self.units.iter().find(|u| u.is_alive() && u.coord == coord)
    }

    pub fn unit_at_mut(&mut self, coord: HexCoord) -> Option<&mut Unit> {
        self.units
            .iter_mut()
            .find(|u| u.is_alive() && u.coord == coord)
    }

    pub fn living_unit_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_alive()).count()
    }

    pub fn has_living_units(&self) -> bool {
        self.units.iter().any(Unit::is_alive)
    }

    pub fn selected_unit_id(&self) -> Option<UnitId> {
        self.selected_unit
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selected_unit.and_then(|id| self.unit(id))
    }

    pub fn selected_unit_mut(&mut self) -> Option<&mut Unit> {
        let id = self.selected_unit?;
        self.unit_mut(id)
    }

    /// Select `id`, deselecting whatever was selected before.
    pub fn select(&mut self, id: UnitId) {
        self.clear_selection();
        if let Some(unit) = self.unit_mut(id) {
            unit.select();
            self.selected_unit = Some(id);
        }
    }

    /// Drop the selection handle, clearing the unit's selected flag.
    pub fn clear_selection(&mut self) {
        if let Some(unit) = self.selected_unit_mut() {
            unit.deselect();
        }
        self.selected_unit = None;
    }

    /// Forget the selection handle without touching unit flags.
    pub fn release_selection(&mut self) {
        self.selected_unit = None;
    }

    /// Whether any owned unit is mid-move.
    pub fn is_animating(&self) -> bool {
        self.units.iter().any(Unit::is_animating)
    }

    /// Advance every unit. Returns true if any move finished.
    pub fn update_units(&mut self, delta_seconds: f32) -> bool {
        let mut finished = false;
        for unit in &mut self.units {
            finished |= unit.update(delta_seconds);
        }
        finished
    }

    /// Remove units marked as garbage. Returns how many were removed.
    pub fn delete_garbage_units(&mut self) -> usize {
        let before = self.units.len();
        self.units.retain(|u| !u.is_garbage());
        if self
            .selected_unit
            .is_some_and(|id| self.unit(id).is_none())
        {
            self.selected_unit = None;
        }
        before - self.units.len()
    }

    /// End this player's turn: wait, and reset every unit's turn flags.
    pub fn end_turn(&mut self) {
        self.turn_state = TurnState::WaitingForTurn;
        self.selected_unit = None;
        for unit in &mut self.units {
            unit.reset_for_turn();
        }
    }
}
