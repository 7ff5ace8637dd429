//! Runtime configuration: timings, start state and network role.

use crate::definitions::ConfigError;
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which side of a network session this process plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NetworkMode {
    /// No peer configured; network games cannot be started.
    #[default]
    None,
    /// Accepts the connection and plays as player 1.
    Host,
    /// Connects to a host and plays as player 2.
    Client,
}

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Map created when a lobby opens without an explicit `LoadMap`.
    pub default_map: String,
    /// State entered on the first frame.
    pub start_state: GameState,
    pub network_mode: NetworkMode,
    /// Length of the intro screen in seconds.
    pub intro_seconds: f32,
    /// Move animation time per traversed tile.
    pub seconds_per_tile: f32,
    /// Lifetime of floating damage text.
    pub floating_damage_seconds: f32,
    /// Yaw rate for units turning toward the cursor or an attacker.
    pub turn_speed_degrees: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            default_map: "Grid12x12".to_string(),
            start_state: GameState::Attract,
            network_mode: NetworkMode::None,
            intro_seconds: 4.5,
            seconds_per_tile: 1.0,
            floating_damage_seconds: 1.0,
            turn_speed_degrees: 90.0,
        }
    }
}

impl GameSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_map.trim().is_empty() {
            return Err(SettingsError::EmptyMapName);
        }
        let durations = [
            ("intro_seconds", self.intro_seconds),
            ("seconds_per_tile", self.seconds_per_tile),
            ("floating_damage_seconds", self.floating_damage_seconds),
            ("turn_speed_degrees", self.turn_speed_degrees),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::NotPositive(field));
            }
        }
        if !matches!(
            self.start_state,
            GameState::Intro | GameState::Attract | GameState::Menu
        ) {
            return Err(SettingsError::InvalidStartState(self.start_state));
        }
        Ok(())
    }

    /// Whether network games can be started.
    pub fn is_networked(&self) -> bool {
        self.network_mode != NetworkMode::None
    }
}

/// Errors from invalid game settings.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsError {
    EmptyMapName,
    NotPositive(&'static str),
    InvalidStartState(GameState),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::EmptyMapName => write!(f, "Default map name cannot be empty"),
            SettingsError::NotPositive(field) => write!(f, "{field} must be a positive number"),
            SettingsError::InvalidStartState(state) => {
                write!(f, "Cannot start in state {state:?}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.default_map, "Grid12x12");
        assert_eq!(settings.start_state, GameState::Attract);
        assert_eq!(settings.network_mode, NetworkMode::None);
        assert_eq!(settings.intro_seconds, 4.5);
        assert_eq!(settings.turn_speed_degrees, 90.0);
        assert!(!settings.is_networked());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            GameSettings::from_json(r#"{ "network_mode": "Host", "seconds_per_tile": 0.5 }"#)
                .unwrap();
        assert_eq!(settings.network_mode, NetworkMode::Host);
        assert_eq!(settings.seconds_per_tile, 0.5);
        assert_eq!(settings.default_map, "Grid12x12");
        assert!(settings.is_networked());
    }

    #[test]
    fn test_validation_empty_map() {
        let settings = GameSettings {
            default_map: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::EmptyMapName));
    }

    #[test]
    fn test_validation_non_positive_duration() {
        let settings = GameSettings {
            seconds_per_tile: 0.0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NotPositive("seconds_per_tile"))
        );
    }

    #[test]
    fn test_validation_start_state() {
        let settings = GameSettings {
            start_state: GameState::Paused,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidStartState(GameState::Paused))
        ));
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = GameSettings::from_json(r#"{ "intro_seconds": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
        assert!(err.to_string().contains("intro_seconds"));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = GameSettings {
            network_mode: NetworkMode::Client,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let restored: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }
}
