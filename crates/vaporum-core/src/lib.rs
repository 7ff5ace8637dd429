//! Vaporum Core Library
//!
//! This crate contains the game logic for Vaporum, a two-player, turn-based
//! tactical battle fought with tanks and artillery on a hex grid.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: rendering, audio and particles are requested
//!   through an [`Effect`] outbox and never fed back into the game
//! - **Deterministic**: combat has no randomness; the same commands always
//!   produce the same match
//! - **One command surface**: local input and network peers both drive the
//!   game through [`Command`] and [`Game::apply`]
//! - **Fail fast on data**: definition files are validated when loaded

// Spatial model
pub mod distance_field;
pub mod hex;
pub mod map;
pub mod types;

// Data and configuration
pub mod definitions;
pub mod settings;

// Units and combat
pub mod animation;
pub mod combat;
pub mod effects;
pub mod unit;

// Turn and game flow
pub mod game;
pub mod player;
pub mod turn;

// Commands and collaborators
pub mod command;
pub mod context;
pub mod input;
pub mod transport;

// Re-exports for convenience
pub use animation::{CatmullRomSpline, MoveAnimation, Timer};
pub use combat::{calculate_damage, can_attack, resolve_attack, CombatResult};
pub use command::{Command, CommandError, Outcome, Source};
pub use context::AppContext;
pub use definitions::{
    AttackRange, ConfigError, Definitions, MapDefinition, TileDefinition, UnitAssets,
    UnitDefinition, UnitType, WorldBounds,
};
pub use distance_field::{DistanceField, PathError, UNREACHED};
pub use effects::{Effect, ParticleKind};
pub use game::{Game, GameState, GameType};
pub use hex::{HexCoord, HexGrid};
pub use input::{InputState, Key};
pub use map::{Tile, TileGrid};
pub use player::{NetState, Player, TurnState};
pub use settings::{GameSettings, NetworkMode, SettingsError};
pub use transport::{OfflineTransport, ScriptedTransport, Transport};
pub use turn::{GameResult, Match, MatchTimings};
pub use types::*;
pub use unit::{Unit, UnitState};
