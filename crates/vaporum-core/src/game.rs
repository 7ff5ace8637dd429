//! Top-level game orchestration.
//!
//! [`Game`] runs the screen-level state machine (intro, attract, menu,
//! lobby, game, paused), owns the running [`Match`], turns local input and
//! peer messages into [`Command`]s, and decides when a match is over.
//!
//! State transitions are requested with [`Game::request_state`] and take
//! effect at the end of the frame: the current state's exit hook runs, the
//! state is swapped, its timer reset, and the new state's enter hook runs.

use crate::command::{Command, CommandError, Outcome, Source};
use crate::context::AppContext;
use crate::effects::Effect;
use crate::input::{InputState, Key};
use crate::player::{NetState, TurnState};
use crate::settings::{GameSettings, NetworkMode};
use crate::turn::{GameResult, Match, MatchTimings};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Screen-level state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Intro,
    Attract,
    Menu,
    Lobby,
    Game,
    Paused,
}

/// Whether the running match is hot-seat or against a network peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Local,
    Network,
}

/// The game: state machine, running match and command queue.
pub struct Game {
    context: AppContext,
    state: GameState,
    next_state: Option<GameState>,
    time_in_state: f32,
    game_type: Option<GameType>,
    current_match: Option<Match>,
    local_ready: bool,
    remote_ready: bool,
    has_game_ended: bool,
    result: Option<GameResult>,
    command_queue: VecDeque<(Command, Source)>,
    quit_requested: bool,
    effects: Vec<Effect>,
}

impl Game {
    /// Create a game in the configured start state.
    pub fn new(context: AppContext) -> Self {
        let state = context.settings.start_state;
        let mut game = Self {
            context,
            state,
            next_state: None,
            time_in_state: 0.0,
            game_type: None,
            current_match: None,
            local_ready: false,
            remote_ready: false,
            has_game_ended: false,
            result: None,
            command_queue: VecDeque::new(),
            quit_requested: false,
            effects: Vec::new(),
        };
        game.enter_state(state);
        info!(?state, "Game started");
        game
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// The transition waiting for the end of the frame, if any.
    pub fn pending_state(&self) -> Option<GameState> {
        self.next_state
    }

    /// Seconds spent in the current state.
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn game_type(&self) -> Option<GameType> {
        self.game_type
    }

    pub fn settings(&self) -> &GameSettings {
        &self.context.settings
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.as_ref()
    }

    pub fn has_game_ended(&self) -> bool {
        self.has_game_ended
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_local_ready(&self) -> bool {
        self.local_ready
    }

    pub fn is_remote_ready(&self) -> bool {
        self.remote_ready
    }

    /// Commands received but not yet executed.
    pub fn pending_commands(&self) -> usize {
        self.command_queue.len()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// True while a unit is travelling; queued commands wait for it.
    pub fn is_animation_playing(&self) -> bool {
        self.current_match
            .as_ref()
            .is_some_and(Match::is_animation_playing)
    }

    /// Take the effects produced since the last drain.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// The side played on this machine in a network game.
    pub fn local_player(&self) -> Option<PlayerId> {
        match (self.game_type?, self.context.settings.network_mode) {
            (GameType::Network, NetworkMode::Host) => Some(PlayerId::One),
            (GameType::Network, NetworkMode::Client) => Some(PlayerId::Two),
            _ => None,
        }
    }

    /// Buffer a transition for the end of the frame.
    pub fn request_state(&mut self, state: GameState) {
        self.next_state = Some(state);
    }

    /// Leave the menu for a hot-seat lobby.
    pub fn start_local_game(&mut self) -> Outcome {
        if self.state != GameState::Menu {
            return Outcome::Ignored;
        }
        self.game_type = Some(GameType::Local);
        self.request_state(GameState::Lobby);
        Outcome::Applied
    }

    /// Leave the menu for a network lobby. Requires a configured network mode.
    pub fn start_network_game(&mut self) -> Outcome {
        if self.state != GameState::Menu || !self.context.settings.is_networked() {
            return Outcome::Ignored;
        }
        self.game_type = Some(GameType::Network);
        self.request_state(GameState::Lobby);
        Outcome::Applied
    }

    pub fn resume_game(&mut self) -> Outcome {
        if self.state != GameState::Paused {
            return Outcome::Ignored;
        }
        self.request_state(GameState::Game);
        Outcome::Applied
    }

    /// Abandon the match. A network peer is told we quit.
    pub fn return_to_menu(&mut self) -> Outcome {
        if !matches!(self.state, GameState::Paused | GameState::Game | GameState::Lobby) {
            return Outcome::Ignored;
        }
        if self.is_network_game() && !self.has_game_ended {
            self.send(&Command::PlayerQuit);
        }
        self.request_state(GameState::Menu);
        Outcome::Applied
    }

    /// Queue a command to run once no animation is playing.
    pub fn enqueue(&mut self, command: Command, source: Source) {
        self.command_queue.push_back((command, source));
    }

    /// Parse a command line and queue it. Malformed lines are rejected.
    pub fn enqueue_line(&mut self, line: &str, source: Source) -> Result<(), CommandError> {
        let command = Command::parse(line)?;
        self.enqueue(command, source);
        Ok(())
    }

    /// Advance one frame.
    pub fn tick(&mut self, delta_seconds: f32, input: &InputState) {
        self.time_in_state += delta_seconds;

        match self.state {
            GameState::Intro => {
                if self.time_in_state >= self.context.settings.intro_seconds
                    || input.was_just_pressed(Key::Confirm)
                {
                    self.request_state(GameState::Attract);
                }
            }
            GameState::Attract => {
                if input.was_just_pressed(Key::Escape) {
                    self.quit_requested = true;
                } else if input.was_just_pressed(Key::Confirm) || input.was_just_pressed(Key::Select)
                {
                    self.request_state(GameState::Menu);
                }
            }
            GameState::Menu => {
                if input.was_just_pressed(Key::Escape) {
                    self.quit_requested = true;
                }
            }
            GameState::Lobby => self.update_lobby(),
            GameState::Game => self.update_game(delta_seconds, input),
            GameState::Paused => {
                if input.was_just_pressed(Key::Escape) {
                    self.request_state(GameState::Game);
                }
            }
        }

        self.poll_transport();
        self.execute_queued_commands();
        self.collect_effects();
        self.handle_state_change();
    }

    /// Apply the buffered transition, if any.
    pub fn handle_state_change(&mut self) {
        let Some(next) = self.next_state.take() else {
            return;
        };
        let previous = self.state;
        self.exit_state(previous);
        self.state = next;
        self.time_in_state = 0.0;
        self.enter_state(next);
        info!(from = ?previous, to = ?next, "Game state changed");
    }

    fn enter_state(&mut self, state: GameState) {
        match state {
            GameState::Menu => {
                self.current_match = None;
                self.local_ready = false;
                self.remote_ready = false;
                self.has_game_ended = false;
                self.result = None;
                self.game_type = None;
                self.command_queue
                    .retain(|(command, _)| matches!(command, Command::PlayerReady));
            }
            GameState::Game => {
                if let Some(result) = self.result {
                    debug!(%result, "Returned to a finished match");
                }
            }
            GameState::Intro | GameState::Attract | GameState::Lobby | GameState::Paused => {}
        }
    }

    fn exit_state(&mut self, state: GameState) {
        if state == GameState::Lobby {
            debug!(
                local_ready = self.local_ready,
                remote_ready = self.remote_ready,
                "Leaving lobby"
            );
        }
    }

    fn update_lobby(&mut self) {
        if self.current_match.is_none() {
            let map = self.context.settings.default_map.clone();
            self.load_map(&map);
        }

        let ready = match self.game_type {
            Some(GameType::Network) => self.local_ready && self.remote_ready,
            _ => self.local_ready,
        };
        if ready && self.current_match.is_some() {
            self.request_state(GameState::Game);
        }
    }

    fn update_game(&mut self, delta_seconds: f32, input: &InputState) {
        if self.has_game_ended {
            if input.was_just_pressed(Key::Select) || input.was_just_pressed(Key::Confirm) {
                self.request_state(GameState::Menu);
            }
        } else if input.was_just_pressed(Key::Escape) {
            self.request_state(GameState::Paused);
        } else {
            self.handle_local_input(input);
        }

        if let Some(current) = self.current_match.as_mut() {
            current.update(delta_seconds);
            current.delete_garbage_units();
        }
        self.detect_game_end();

        if self.is_network_game() && !self.has_game_ended && !self.context.transport.is_connected() {
            warn!("Peer disconnected");
            self.player_quit(Source::Remote);
        }
    }

    /// Map this frame's input onto commands for the local current player.
    fn handle_local_input(&mut self, input: &InputState) {
        let Some(current) = self.current_match.as_ref() else {
            return;
        };
        let Some(player) = current.current_player() else {
            return;
        };
        if player.net_state != NetState::Local {
            return;
        }
        let turn_state = player.turn_state;

        let hovered = input
            .cursor_world
            .and_then(|point| current.tiles().hex_at_world(point));
        if let Some(hex) = hovered {
            self.issue_local(Command::SetFocusedHex(hex));
        }
        let focus = self.current_match.as_ref().and_then(Match::focused_hex);

        for key in &input.just_pressed {
            let command = match (key, turn_state) {
                (Key::Select, TurnState::NoSelection) => Command::SelectFocusedUnit,
                (Key::Select, TurnState::UnitSelectedMove) => match focus {
                    Some(hex) => Command::Move(hex),
                    None => continue,
                },
                (Key::Select, TurnState::UnitSelectedAttack) => Command::Attack,
                (Key::Confirm, TurnState::UnitSelectedMove) => Command::Stay,
                (Key::Confirm, TurnState::UnitSelectedAttack) => Command::HoldFire,
                (Key::Cancel, _) => Command::Cancel,
                (Key::EndTurn, _) => Command::EndTurn,
                _ => continue,
            };
            self.issue_local(command);
            // One turn action per frame; later keys see a stale turn state.
            if !matches!(key, Key::Cancel) {
                break;
            }
        }
    }

    /// Apply a local command and mirror it to the peer if it took effect.
    fn issue_local(&mut self, command: Command) {
        match self.apply(command.clone(), Source::Local) {
            Ok(Outcome::Applied) if command.is_shared() && self.is_network_game() => {
                self.send(&command)
            }
            Ok(_) => {}
            Err(err) => debug!(%command, error = %err, "Local command rejected"),
        }
    }

    /// Single entry point for every command, local or remote.
    pub fn apply(&mut self, command: Command, source: Source) -> Result<Outcome, CommandError> {
        let outcome = match command {
            Command::Unrecognized(line) => {
                debug!(%line, ?source, "Unrecognized command");
                Outcome::Ignored
            }
            Command::LoadMap { name } => {
                if name.trim().is_empty() {
                    return Err(CommandError::InvalidArgument {
                        command: "LoadMap",
                        argument: "name",
                        value: name,
                    });
                }
                if matches!(self.state, GameState::Lobby | GameState::Game) {
                    self.load_map(&name)
                } else {
                    Outcome::Ignored
                }
            }
            Command::PlayerReady => self.player_ready(source),
            Command::PlayerQuit => self.player_quit(source),
            turn_action => self.apply_turn_action(turn_action, source),
        };
        Ok(outcome)
    }

    fn apply_turn_action(&mut self, command: Command, source: Source) -> Outcome {
        if self.state != GameState::Game {
            debug!(%command, state = ?self.state, "Turn action outside a match");
            return Outcome::Ignored;
        }
        let Some(current) = self.current_match.as_mut() else {
            return Outcome::Ignored;
        };
        let Some(player) = current.current_player() else {
            return Outcome::Ignored;
        };
        let expected = match source {
            Source::Local => NetState::Local,
            Source::Remote => NetState::Remote,
        };
        if player.net_state != expected {
            debug!(%command, ?source, player = %player.id, "Not this source's turn");
            return Outcome::Ignored;
        }

        let outcome = match command {
            Command::SetFocusedHex(hex) => current.set_focused_hex(hex),
            Command::SelectFocusedUnit => current.select_focused_unit(),
            Command::Move(hex) => current.move_to(hex),
            Command::Stay => current.stay(),
            Command::HoldFire => current.hold_fire(),
            Command::Attack => current.attack(),
            Command::Cancel => current.cancel(),
            Command::EndTurn => current.end_turn(),
            _ => Outcome::Ignored,
        };

        if outcome.is_applied() && command == Command::EndTurn {
            self.detect_game_end();
        }
        outcome
    }

    fn load_map(&mut self, name: &str) -> Outcome {
        let Some(map) = self.context.definitions.map(name).cloned() else {
            warn!(map = name, "Unknown map");
            return Outcome::Ignored;
        };

        let net_states = match (self.game_type, self.context.settings.network_mode) {
            (Some(GameType::Network), NetworkMode::Host) => [NetState::Local, NetState::Remote],
            (Some(GameType::Network), NetworkMode::Client) => [NetState::Remote, NetState::Local],
            _ => [NetState::Local, NetState::Local],
        };
        let timings = MatchTimings::from(&self.context.settings);

        match Match::new(&map, &self.context.definitions, net_states, timings) {
            Ok(created) => {
                self.current_match = Some(created);
                self.has_game_ended = false;
                self.result = None;
                self.player_ready(Source::Local);
                Outcome::Applied
            }
            Err(err) => {
                warn!(map = name, error = %err, "Failed to create match");
                Outcome::Ignored
            }
        }
    }

    fn player_ready(&mut self, source: Source) -> Outcome {
        if !matches!(self.state, GameState::Menu | GameState::Lobby) {
            return Outcome::Ignored;
        }
        match source {
            Source::Local => {
                self.local_ready = true;
                if self.is_network_game() {
                    self.send(&Command::PlayerReady);
                }
            }
            Source::Remote => self.remote_ready = true,
        }
        debug!(?source, "Player ready");
        Outcome::Applied
    }

    fn player_quit(&mut self, source: Source) -> Outcome {
        match source {
            Source::Local => {
                if self.is_network_game() && !self.has_game_ended {
                    self.send(&Command::PlayerQuit);
                }
                self.request_state(GameState::Menu);
            }
            Source::Remote => {
                if !self.is_network_game() || self.has_game_ended {
                    return Outcome::Ignored;
                }
                match self.state {
                    GameState::Game | GameState::Paused => {
                        if let Some(local) = self.local_player() {
                            self.finish(GameResult::Winner(local));
                        }
                    }
                    GameState::Lobby => self.request_state(GameState::Menu),
                    _ => return Outcome::Ignored,
                }
                info!("Opponent quit");
            }
        }
        Outcome::Applied
    }

    fn detect_game_end(&mut self) {
        if self.has_game_ended {
            return;
        }
        if let Some(result) = self.current_match.as_ref().and_then(Match::check_game_end) {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: GameResult) {
        self.has_game_ended = true;
        self.result = Some(result);
        info!(%result, "Game over");
    }

    fn poll_transport(&mut self) {
        while let Some(line) = self.context.transport.poll_incoming() {
            match Command::parse(&line) {
                Ok(command) => self.command_queue.push_back((command, Source::Remote)),
                Err(err) => warn!(%line, error = %err, "Malformed remote command"),
            }
        }
    }

    /// Run queued commands in order, pausing whenever one starts an animation.
    fn execute_queued_commands(&mut self) {
        while !self.is_animation_playing() {
            match self.command_queue.front() {
                Some((command, _)) if self.is_held(command) => break,
                Some(_) => {}
                None => break,
            }
            let Some((command, source)) = self.command_queue.pop_front() else {
                break;
            };
            match source {
                Source::Local => self.issue_local(command),
                Source::Remote => {
                    if let Err(err) = self.apply(command, source) {
                        warn!(error = %err, "Remote command rejected");
                    }
                }
            }
        }
    }

    /// Turn actions wait in the queue while a loaded match is off screen.
    fn is_held(&self, command: &Command) -> bool {
        command.is_turn_action()
            && self.current_match.is_some()
            && matches!(self.state, GameState::Lobby | GameState::Paused)
    }

    fn collect_effects(&mut self) {
        if let Some(current) = self.current_match.as_mut() {
            self.effects.extend(current.drain_effects());
        }
    }

    fn is_network_game(&self) -> bool {
        self.game_type == Some(GameType::Network)
    }

    fn send(&mut self, command: &Command) {
        self.context.transport.queue_outgoing(command.to_string());
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("next_state", &self.next_state)
            .field("game_type", &self.game_type)
            .field("has_game_ended", &self.has_game_ended)
            .field("result", &self.result)
            .field("pending_commands", &self.command_queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Definitions;
    use crate::hex::HexCoord;
    use crate::transport::OfflineTransport;
    use std::sync::Arc;

    fn create_game(start_state: GameState) -> Game {
        let settings = GameSettings {
            start_state,
            ..Default::default()
        };
        let context = AppContext::new(
            Arc::new(Definitions::builtin().unwrap()),
            settings,
            Box::new(OfflineTransport),
        )
        .unwrap();
        Game::new(context)
    }

    fn idle() -> InputState {
        InputState::default()
    }

    #[test]
    fn test_intro_times_out() {
        let mut game = create_game(GameState::Intro);
        game.tick(4.0, &idle());
        assert_eq!(game.state(), GameState::Intro);
        game.tick(0.6, &idle());
        assert_eq!(game.state(), GameState::Attract);
        assert_eq!(game.time_in_state(), 0.0);
    }

    #[test]
    fn test_transition_is_deferred() {
        let mut game = create_game(GameState::Menu);
        game.request_state(GameState::Lobby);
        assert_eq!(game.state(), GameState::Menu);
        assert_eq!(game.pending_state(), Some(GameState::Lobby));
        game.handle_state_change();
        assert_eq!(game.state(), GameState::Lobby);
        assert_eq!(game.pending_state(), None);
    }

    #[test]
    fn test_attract_to_menu_and_quit() {
        let mut game = create_game(GameState::Attract);
        game.tick(0.1, &InputState::new().with_key(Key::Confirm));
        assert_eq!(game.state(), GameState::Menu);
        game.tick(0.1, &InputState::new().with_key(Key::Escape));
        assert!(game.quit_requested());
    }

    #[test]
    fn test_local_game_reaches_game_state() {
        let mut game = create_game(GameState::Menu);
        assert_eq!(game.start_local_game(), Outcome::Applied);
        game.tick(0.016, &idle());
        assert_eq!(game.state(), GameState::Lobby);

        game.tick(0.016, &idle());
        assert!(game.current_match().is_some());
        assert!(game.is_local_ready());
        assert_eq!(game.state(), GameState::Game);
        assert_eq!(game.game_type(), Some(GameType::Local));
    }

    #[test]
    fn test_network_game_needs_network_mode() {
        let mut game = create_game(GameState::Menu);
        assert_eq!(game.start_network_game(), Outcome::Ignored);
        assert_eq!(game.pending_state(), None);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut game = create_game(GameState::Menu);
        game.start_local_game();
        game.tick(0.016, &idle());
        game.tick(0.016, &idle());

        game.tick(0.016, &InputState::new().with_key(Key::Escape));
        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.resume_game(), Outcome::Applied);
        game.tick(0.016, &idle());
        assert_eq!(game.state(), GameState::Game);

        game.tick(0.016, &InputState::new().with_key(Key::Escape));
        game.return_to_menu();
        game.tick(0.016, &idle());
        assert_eq!(game.state(), GameState::Menu);
        assert!(game.current_match().is_none());
        assert_eq!(game.game_type(), None);
    }

    fn start_game() -> Game {
        let mut game = create_game(GameState::Menu);
        game.start_local_game();
        game.tick(0.016, &idle());
        game.tick(0.016, &idle());
        assert_eq!(game.state(), GameState::Game);
        game
    }

    fn current_player(game: &Game) -> Option<PlayerId> {
        game.current_match().and_then(Match::current_player_id)
    }

    #[test]
    fn test_turn_actions_wait_while_paused() {
        let mut game = start_game();
        game.tick(0.016, &InputState::new().with_key(Key::Escape));
        assert_eq!(game.state(), GameState::Paused);

        game.enqueue(Command::EndTurn, Source::Local);
        game.enqueue(Command::PlayerReady, Source::Remote);
        game.tick(0.016, &idle());
        game.tick(0.016, &idle());
        assert_eq!(game.pending_commands(), 2);
        assert_eq!(current_player(&game), Some(PlayerId::One));

        game.resume_game();
        game.tick(0.016, &idle());
        game.tick(0.016, &idle());
        assert_eq!(game.pending_commands(), 0);
        assert_eq!(current_player(&game), Some(PlayerId::Two));
    }

    #[test]
    fn test_pausing_frame_still_updates_match() {
        let mut game = start_game();
        for command in [
            Command::SetFocusedHex(HexCoord::new(2, 1)),
            Command::SelectFocusedUnit,
            Command::Move(HexCoord::new(2, 3)),
        ] {
            game.enqueue(command, Source::Local);
        }
        game.tick(0.016, &idle());
        assert!(game.is_animation_playing());

        game.tick(5.0, &InputState::new().with_key(Key::Escape));
        assert_eq!(game.state(), GameState::Paused);
        assert!(!game.is_animation_playing());
    }

    #[test]
    fn test_turn_actions_ignored_outside_game() {
        let mut game = create_game(GameState::Menu);
        assert_eq!(game.apply(Command::EndTurn, Source::Local), Ok(Outcome::Ignored));
        assert_eq!(
            game.apply(Command::Unrecognized("Dance".into()), Source::Remote),
            Ok(Outcome::Ignored)
        );
        assert!(game
            .apply(Command::LoadMap { name: " ".into() }, Source::Local)
            .is_err());
    }
}
