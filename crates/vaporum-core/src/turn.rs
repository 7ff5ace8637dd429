//! Turn controller for a running match.
//!
//! A [`Match`] owns the tile grid and both players. Every mutation of units
//! or tiles during play goes through its operations, which implement the
//! per-player turn state machine:
//!
//! ```text
//! WaitingForTurn ──(opponent ends turn)──► NoSelection
//! NoSelection ──select──► UnitSelectedMove ──move/stay──► UnitSelectedAttack
//! UnitSelectedAttack ──attack/hold fire──► NoSelection
//! UnitSelectedAttack ──cancel──► UnitSelectedMove ──cancel──► NoSelection
//! any ──end turn──► WaitingForTurn (opponent becomes current)
//! ```
//!
//! Illegal requests never fail: they return [`Outcome::Ignored`] and leave
//! the match untouched.

use crate::combat::{can_attack, resolve_attack};
use crate::command::Outcome;
use crate::definitions::{ConfigError, Definitions, MapDefinition};
use crate::effects::Effect;
use crate::hex::HexCoord;
use crate::map::TileGrid;
use crate::player::{NetState, Player, TurnState};
use crate::settings::GameSettings;
use crate::types::{PlayerId, UnitId};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner(player) => write!(f, "Player {player} Wins"),
            GameResult::Draw => write!(f, "Draw"),
        }
    }
}

/// Time constants used while a match runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchTimings {
    pub seconds_per_tile: f32,
    pub floating_damage_seconds: f32,
    pub turn_speed_degrees: f32,
}

impl Default for MatchTimings {
    fn default() -> Self {
        Self::from(&GameSettings::default())
    }
}

impl From<&GameSettings> for MatchTimings {
    fn from(settings: &GameSettings) -> Self {
        Self {
            seconds_per_tile: settings.seconds_per_tile,
            floating_damage_seconds: settings.floating_damage_seconds,
            turn_speed_degrees: settings.turn_speed_degrees,
        }
    }
}

/// A match in progress: the battle map, both players and their units.
#[derive(Clone, Debug)]
pub struct Match {
    tiles: TileGrid,
    players: [Player; 2],
    timings: MatchTimings,
    effects: Vec<Effect>,
}

impl Match {
    /// Build a match from a map definition and spawn both armies.
    ///
    /// Player one moves first.
    pub fn new(
        map: &MapDefinition,
        defs: &Definitions,
        net_states: [NetState; 2],
        timings: MatchTimings,
    ) -> Result<Self, ConfigError> {
        let tiles = TileGrid::from_definition(map, defs)?;
        let mut players = [
            Player::new(PlayerId::One, net_states[0]),
            Player::new(PlayerId::Two, net_states[1]),
        ];

        let mut next_id = 0;
        for player in &mut players {
            player.spawn_units(map, defs, &tiles, &mut next_id)?;
        }

        info!(
            map = %map.name,
            units = next_id,
            p1 = ?net_states[0],
            p2 = ?net_states[1],
            "Match created"
        );
        Ok(Self::from_parts(tiles, players, timings))
    }

    /// Assemble a match from a prepared grid and players.
    ///
    /// Player one becomes current; player two waits.
    pub fn from_parts(tiles: TileGrid, mut players: [Player; 2], timings: MatchTimings) -> Self {
        players[0].turn_state = TurnState::NoSelection;
        players[1].turn_state = TurnState::WaitingForTurn;
        Self {
            tiles,
            players,
            timings,
            effects: Vec::new(),
        }
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn timings(&self) -> MatchTimings {
        self.timings
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// The player whose turn it is. `None` only once the game has ended.
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.turn_state != TurnState::WaitingForTurn)
            .map(|p| p.id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_id().map(|id| self.player(id))
    }

    /// The opponent of the current player.
    pub fn waiting_player(&self) -> Option<&Player> {
        self.current_player_id().map(|id| self.player(id.other()))
    }

    /// Turn state of the current player, `WaitingForTurn` when nobody is current.
    pub fn current_turn_state(&self) -> TurnState {
        self.current_player()
            .map_or(TurnState::WaitingForTurn, |p| p.turn_state)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.players.iter().find_map(|p| p.unit(id))
    }

    /// The living unit on `coord`, whichever side owns it.
    pub fn unit_at(&self, coord: HexCoord) -> Option<&Unit> {
        self.players.iter().find_map(|p| p.unit_at(coord))
    }

    pub fn focused_hex(&self) -> Option<HexCoord> {
        self.tiles.focused()
    }

    /// The living unit on the focused tile.
    pub fn hovered_unit(&self) -> Option<&Unit> {
        self.focused_hex().and_then(|c| self.unit_at(c))
    }

    /// True while any unit is travelling along a path.
    pub fn is_animation_playing(&self) -> bool {
        self.players.iter().any(Player::is_animating)
    }

    /// Move the hover focus to `coord`.
    pub fn set_focused_hex(&mut self, coord: HexCoord) -> Outcome {
        if self.tiles.focused() == Some(coord) {
            return Outcome::Ignored;
        }
        if !self.tiles.set_focus(coord) {
            return ignored("SetFocusedHex", "coordinate out of bounds");
        }
        Outcome::Applied
    }

    /// Select the current player's unit under the focus.
    pub fn select_focused_unit(&mut self) -> Outcome {
        const ACTION: &str = "SelectFocusedUnit";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        if self.player(current).turn_state != TurnState::NoSelection {
            return ignored(ACTION, "a unit is already selected");
        }
        let Some(focus) = self.focused_hex() else {
            return ignored(ACTION, "no focused tile");
        };
        let Some(unit) = self.player(current).unit_at(focus) else {
            return ignored(ACTION, "no friendly unit on focused tile");
        };
        if unit.orders_issued {
            return ignored(ACTION, "unit already has orders");
        }

        let id = unit.id;
        let player = &mut self.players[current.index()];
        player.select(id);
        player.turn_state = TurnState::UnitSelectedMove;
        debug!(player = %current, unit = %id, "Unit selected");
        Outcome::Applied
    }

    /// Move the selected unit to `target`.
    pub fn move_to(&mut self, target: HexCoord) -> Outcome {
        const ACTION: &str = "Move";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        if self.player(current).turn_state != TurnState::UnitSelectedMove {
            return ignored(ACTION, "not choosing a move");
        }
        let Some(unit) = self.player(current).selected_unit() else {
            return ignored(ACTION, "no selected unit");
        };
        if unit.did_move {
            return ignored(ACTION, "unit already moved");
        }
        if !self.is_valid_destination(unit, target) {
            return ignored(ACTION, "destination not reachable this turn");
        }

        let seconds_per_tile = self.timings.seconds_per_tile;
        let player = &mut self.players[current.index()];
        let Some(unit) = player.selected_unit_mut() else {
            return ignored(ACTION, "no selected unit");
        };
        if let Err(err) = unit.begin_move(target, &self.tiles, seconds_per_tile) {
            debug!(action = ACTION, error = %err, "Ignored");
            return Outcome::Ignored;
        }
        unit.is_targeting = true;
        debug!(player = %current, unit = %unit.id, to = %target, "Unit moving");
        player.turn_state = TurnState::UnitSelectedAttack;
        Outcome::Applied
    }

    /// Keep the selected unit where it is and go straight to targeting.
    pub fn stay(&mut self) -> Outcome {
        const ACTION: &str = "Stay";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        let player = &mut self.players[current.index()];
        if player.turn_state != TurnState::UnitSelectedMove {
            return ignored(ACTION, "not choosing a move");
        }
        let Some(unit) = player.selected_unit_mut() else {
            return ignored(ACTION, "no selected unit");
        };
        unit.is_targeting = true;
        player.turn_state = TurnState::UnitSelectedAttack;
        Outcome::Applied
    }

    /// Attack the enemy unit under the focus with the selected unit.
    pub fn attack(&mut self) -> Outcome {
        const ACTION: &str = "Attack";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        if self.player(current).turn_state != TurnState::UnitSelectedAttack {
            return ignored(ACTION, "not choosing a target");
        }
        let Some(attacker_id) = self.player(current).selected_unit_id() else {
            return ignored(ACTION, "no selected unit");
        };
        let Some(focus) = self.focused_hex() else {
            return ignored(ACTION, "no focused tile");
        };

        let (own, enemy) = split_players(&mut self.players, current);
        let Some(target) = enemy.unit_at_mut(focus) else {
            return ignored(ACTION, "no enemy unit on focused tile");
        };
        let Some(attacker) = own.unit_mut(attacker_id) else {
            return ignored(ACTION, "no selected unit");
        };
        if !can_attack(attacker, target) {
            return ignored(ACTION, "target cannot be attacked");
        }

        let result = resolve_attack(
            attacker,
            target,
            self.timings.floating_damage_seconds,
            &mut self.effects,
        );
        own.release_selection();
        own.turn_state = TurnState::NoSelection;
        debug!(player = %current, ?result, "Attack resolved");
        Outcome::Applied
    }

    /// Finish the selected unit's orders without attacking.
    pub fn hold_fire(&mut self) -> Outcome {
        const ACTION: &str = "HoldFire";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        let player = &mut self.players[current.index()];
        if player.turn_state != TurnState::UnitSelectedAttack {
            return ignored(ACTION, "not choosing a target");
        }
        let Some(unit) = player.selected_unit_mut() else {
            return ignored(ACTION, "no selected unit");
        };
        unit.issue_orders();
        player.release_selection();
        player.turn_state = TurnState::NoSelection;
        Outcome::Applied
    }

    /// Step back one stage of the current selection.
    ///
    /// From target selection this rolls the unit back to where it started
    /// the turn, aborting any move in flight.
    pub fn cancel(&mut self) -> Outcome {
        const ACTION: &str = "Cancel";
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };
        let player = &mut self.players[current.index()];
        match player.turn_state {
            TurnState::UnitSelectedMove => {
                player.clear_selection();
                player.turn_state = TurnState::NoSelection;
                Outcome::Applied
            }
            TurnState::UnitSelectedAttack => {
                let Some(unit) = player.selected_unit_mut() else {
                    return ignored(ACTION, "no selected unit");
                };
                unit.cancel_move(&self.tiles);
                unit.is_targeting = false;
                debug!(player = %current, unit = %unit.id, to = %unit.coord, "Move cancelled");
                player.turn_state = TurnState::UnitSelectedMove;
                Outcome::Applied
            }
            _ => ignored(ACTION, "nothing to cancel"),
        }
    }

    /// Hand the turn to the other player.
    pub fn end_turn(&mut self) -> Outcome {
        const ACTION: &str = "EndTurn";
        if self.is_animation_playing() {
            return ignored(ACTION, "animation playing");
        }
        let Some(current) = self.current_player_id() else {
            return ignored(ACTION, "no current player");
        };

        self.players[current.index()].turn_state = TurnState::EndTurn;
        self.players[current.index()].end_turn();

        if self.check_game_end().is_none() {
            self.players[current.other().index()].turn_state = TurnState::NoSelection;
            info!(from = %current, to = %current.other(), "Turn ended");
        } else {
            info!(player = %current, "Turn ended after game over");
        }
        Outcome::Applied
    }

    /// Advance animations, timers and unit facing by one frame.
    pub fn update(&mut self, delta_seconds: f32) {
        for player in &mut self.players {
            if player.update_units(delta_seconds) {
                debug!(player = %player.id, "Move finished");
            }
        }
        self.update_facing(delta_seconds);
    }

    fn update_facing(&mut self, delta_seconds: f32) {
        let Some(current) = self.current_player_id() else {
            return;
        };
        let Some(focus) = self.focused_hex() else {
            return;
        };
        let max_delta = self.timings.turn_speed_degrees * delta_seconds;
        let state = self.player(current).turn_state;
        let (own, enemy) = split_players(&mut self.players, current);

        if !matches!(state, TurnState::UnitSelectedMove | TurnState::UnitSelectedAttack) {
            return;
        }
        let Some(selected) = own.selected_unit_mut() else {
            return;
        };
        if selected.is_animating() {
            return;
        }
        if selected.coord != focus {
            selected.turn_toward(focus.world_position(), max_delta);
        }

        if state == TurnState::UnitSelectedAttack {
            let attacker_position = selected.position;
            if let Some(target) = enemy.unit_at_mut(focus) {
                target.turn_toward(attacker_position, max_delta);
            }
        }
    }

    /// Remove dead units from both armies.
    pub fn delete_garbage_units(&mut self) -> usize {
        self.players
            .iter_mut()
            .map(Player::delete_garbage_units)
            .sum()
    }

    /// The result if either army has been wiped out.
    pub fn check_game_end(&self) -> Option<GameResult> {
        let one_alive = self.players[0].has_living_units();
        let two_alive = self.players[1].has_living_units();
        match (one_alive, two_alive) {
            (false, false) => Some(GameResult::Draw),
            (false, true) => Some(GameResult::Winner(PlayerId::Two)),
            (true, false) => Some(GameResult::Winner(PlayerId::One)),
            (true, true) => None,
        }
    }

    /// Tiles the selected unit may move to this turn.
    pub fn move_range_tiles(&self) -> Vec<HexCoord> {
        let Some(unit) = self.moving_unit() else {
            return Vec::new();
        };
        self.tiles
            .grid()
            .coords()
            .filter(|c| self.is_valid_destination(unit, *c))
            .collect()
    }

    /// Path the selected unit would take to the focused tile.
    pub fn preview_path(&self) -> Option<Vec<HexCoord>> {
        let unit = self.moving_unit()?;
        let focus = self.focused_hex()?;
        if !self.is_valid_destination(unit, focus) {
            return None;
        }
        unit.path_to(focus).ok()
    }

    /// Enemy units the selected unit can attack right now.
    pub fn attack_targets(&self) -> Vec<UnitId> {
        let Some(current) = self.current_player() else {
            return Vec::new();
        };
        if current.turn_state != TurnState::UnitSelectedAttack {
            return Vec::new();
        }
        let Some(attacker) = current.selected_unit() else {
            return Vec::new();
        };
        self.player(current.id.other())
            .units()
            .iter()
            .filter(|target| can_attack(attacker, target))
            .map(|target| target.id)
            .collect()
    }

    /// Take the effects queued by combat since the last drain.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn moving_unit(&self) -> Option<&Unit> {
        let current = self.current_player()?;
        if current.turn_state != TurnState::UnitSelectedMove {
            return None;
        }
        current.selected_unit().filter(|u| !u.did_move)
    }

    fn is_valid_destination(&self, unit: &Unit, target: HexCoord) -> bool {
        self.tiles.in_bounds(target)
            && !self.tiles.is_blocked(target)
            && self.unit_at(target).is_none()
            && unit.coord.distance(&target) <= unit.definition.movement_range
            && unit.distance_field().is_reachable(target)
    }
}

fn split_players(players: &mut [Player; 2], current: PlayerId) -> (&mut Player, &mut Player) {
    let [one, two] = players;
    match current {
        PlayerId::One => (one, two),
        PlayerId::Two => (two, one),
    }
}

fn ignored(action: &'static str, reason: &'static str) -> Outcome {
    debug!(action, reason, "Ignored");
    Outcome::Ignored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{AttackRange, TileDefinition, UnitAssets, UnitDefinition, UnitType};
    use glam::Vec3;
    use std::sync::Arc;

    fn tank() -> Arc<UnitDefinition> {
        Arc::new(UnitDefinition {
            name: "Tank".into(),
            symbol: 'T',
            unit_type: UnitType::Tank,
            attack_damage: 10,
            attack_range: AttackRange::new(1, 2),
            movement_range: 3,
            defense: 5,
            max_health: 10,
            muzzle_offset: Vec3::ZERO,
            assets: UnitAssets::default(),
        })
    }

    fn plain_map() -> TileGrid {
        TileGrid::filled(
            8,
            8,
            Arc::new(TileDefinition {
                name: "Plain".into(),
                symbol: '.',
                is_blocked: false,
            }),
        )
    }

    /// One tank each: P1 at (1,1), P2 at (1,4).
    fn create_match() -> Match {
        let tiles = plain_map();
        let mut one = Player::new(PlayerId::One, NetState::Local);
        let mut two = Player::new(PlayerId::Two, NetState::Local);
        one.add_unit(Unit::new(UnitId(0), PlayerId::One, tank(), HexCoord::new(1, 1), 0.0, &tiles));
        two.add_unit(Unit::new(UnitId(1), PlayerId::Two, tank(), HexCoord::new(1, 4), 180.0, &tiles));
        Match::from_parts(tiles, [one, two], MatchTimings::default())
    }

    fn select(m: &mut Match, coord: HexCoord) {
        m.set_focused_hex(coord);
        assert_eq!(m.select_focused_unit(), Outcome::Applied);
    }

    fn finish_animation(m: &mut Match) {
        m.update(10.0);
        assert!(!m.is_animation_playing());
    }

    #[test]
    fn test_game_result_display() {
        assert_eq!(GameResult::Winner(PlayerId::Two).to_string(), "Player 2 Wins");
        assert_eq!(GameResult::Draw.to_string(), "Draw");
    }

    #[test]
    fn test_new_match_from_builtin_map() {
        let defs = Definitions::builtin().unwrap();
        let map = defs.require_map("Grid12x12").unwrap();
        let m = Match::new(map, &defs, [NetState::Local, NetState::Remote], MatchTimings::default())
            .unwrap();
        assert_eq!(m.current_player_id(), Some(PlayerId::One));
        assert_eq!(m.player(PlayerId::Two).net_state, NetState::Remote);
        assert_eq!(m.player(PlayerId::One).units().len(), 6);
        assert!(m.check_game_end().is_none());
    }

    #[test]
    fn test_select_requires_own_unit() {
        let mut m = create_match();
        m.set_focused_hex(HexCoord::new(1, 4));
        assert_eq!(m.select_focused_unit(), Outcome::Ignored);
        m.set_focused_hex(HexCoord::new(3, 3));
        assert_eq!(m.select_focused_unit(), Outcome::Ignored);

        select(&mut m, HexCoord::new(1, 1));
        assert_eq!(m.current_turn_state(), TurnState::UnitSelectedMove);
        assert_eq!(m.select_focused_unit(), Outcome::Ignored);
    }

    #[test]
    fn test_move_then_cancel_then_stay() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));

        assert_eq!(m.move_to(HexCoord::new(3, 1)), Outcome::Applied);
        assert!(m.is_animation_playing());
        assert_eq!(m.current_turn_state(), TurnState::UnitSelectedAttack);
        // Actions other than cancel wait for the animation
        assert_eq!(m.hold_fire(), Outcome::Ignored);

        assert_eq!(m.cancel(), Outcome::Applied);
        assert!(!m.is_animation_playing());
        assert_eq!(m.current_turn_state(), TurnState::UnitSelectedMove);
        let unit = m.unit(UnitId(0)).unwrap();
        assert_eq!(unit.coord, HexCoord::new(1, 1));
        assert!(!unit.did_move);

        assert_eq!(m.stay(), Outcome::Applied);
        assert_eq!(m.hold_fire(), Outcome::Applied);
        assert_eq!(m.current_turn_state(), TurnState::NoSelection);
        assert!(m.unit(UnitId(0)).unwrap().orders_issued);

        // Ordered units cannot be reselected this turn
        m.set_focused_hex(HexCoord::new(0, 0));
        m.set_focused_hex(HexCoord::new(1, 1));
        assert_eq!(m.select_focused_unit(), Outcome::Ignored);
    }

    #[test]
    fn test_move_rejections() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));
        // Too far
        assert_eq!(m.move_to(HexCoord::new(1, 6)), Outcome::Ignored);
        // Occupied by the enemy
        assert_eq!(m.move_to(HexCoord::new(1, 4)), Outcome::Ignored);
        // Off the grid
        assert_eq!(m.move_to(HexCoord::new(-1, 1)), Outcome::Ignored);
        assert_eq!(m.current_turn_state(), TurnState::UnitSelectedMove);
        assert_eq!(m.unit(UnitId(0)).unwrap().coord, HexCoord::new(1, 1));
    }

    #[test]
    fn test_attack_and_counter() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));
        assert_eq!(m.move_to(HexCoord::new(1, 3)), Outcome::Applied);
        finish_animation(&mut m);

        assert_eq!(m.attack_targets(), vec![UnitId(1)]);
        m.set_focused_hex(HexCoord::new(1, 4));
        assert_eq!(m.attack(), Outcome::Applied);
        assert_eq!(m.current_turn_state(), TurnState::NoSelection);
        assert_eq!(m.unit(UnitId(1)).unwrap().health, 6);
        assert_eq!(m.unit(UnitId(0)).unwrap().health, 6);
        assert!(!m.drain_effects().is_empty());
        assert!(m.drain_effects().is_empty());
    }

    #[test]
    fn test_end_turn_hands_off() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));
        m.move_to(HexCoord::new(2, 1));
        finish_animation(&mut m);

        assert_eq!(m.end_turn(), Outcome::Applied);
        assert_eq!(m.current_player_id(), Some(PlayerId::Two));
        assert_eq!(m.player(PlayerId::One).turn_state, TurnState::WaitingForTurn);
        let unit = m.unit(UnitId(0)).unwrap();
        assert!(!unit.did_move && !unit.is_selected && !unit.orders_issued);
        assert_eq!(unit.previous_coord, HexCoord::new(2, 1));
    }

    #[test]
    fn test_move_range_and_preview() {
        let mut m = create_match();
        assert!(m.move_range_tiles().is_empty());
        select(&mut m, HexCoord::new(1, 1));

        let range = m.move_range_tiles();
        assert!(range.contains(&HexCoord::new(4, 1)));
        assert!(!range.contains(&HexCoord::new(1, 1)));
        assert!(!range.contains(&HexCoord::new(1, 4)));
        assert!(range.iter().all(|c| c.distance(&HexCoord::new(1, 1)) <= 3));

        m.set_focused_hex(HexCoord::new(3, 1));
        let path = m.preview_path().unwrap();
        assert_eq!(path.first(), Some(&HexCoord::new(1, 1)));
        assert_eq!(path.last(), Some(&HexCoord::new(3, 1)));
    }

    #[test]
    fn test_selected_unit_faces_focus() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));
        m.set_focused_hex(HexCoord::new(1, 2));
        m.update(0.5);
        // 90 degrees per second, target at yaw 90
        assert_eq!(m.unit(UnitId(0)).unwrap().yaw_degrees, 45.0);
        m.update(1.0);
        assert!((m.unit(UnitId(0)).unwrap().yaw_degrees - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_game_end_and_sweep() {
        let mut m = create_match();
        select(&mut m, HexCoord::new(1, 1));
        m.move_to(HexCoord::new(1, 3));
        finish_animation(&mut m);
        m.set_focused_hex(HexCoord::new(1, 4));
        m.attack();
        m.end_turn();

        // Both tanks at 6; P2 strikes back and takes the counter
        select(&mut m, HexCoord::new(1, 4));
        m.stay();
        m.set_focused_hex(HexCoord::new(1, 3));
        assert_eq!(m.attack(), Outcome::Applied);
        assert_eq!(m.unit(UnitId(0)).unwrap().health, 2);
        assert_eq!(m.unit(UnitId(1)).unwrap().health, 2);
        m.end_turn();

        select(&mut m, HexCoord::new(1, 3));
        m.stay();
        m.set_focused_hex(HexCoord::new(1, 4));
        assert_eq!(m.attack(), Outcome::Applied);
        assert!(m.unit(UnitId(1)).unwrap().is_dead());
        assert!(m.unit_at(HexCoord::new(1, 4)).is_none());
        assert_eq!(m.unit(UnitId(0)).unwrap().health, 2);
        assert_eq!(m.check_game_end(), Some(GameResult::Winner(PlayerId::One)));

        assert_eq!(m.delete_garbage_units(), 1);
        assert!(m.unit(UnitId(1)).is_none());

        m.end_turn();
        assert_eq!(m.current_player_id(), None);
    }
}
