//! Textual command vocabulary shared by local input, the console and the
//! network peer.
//!
//! A command line is a case-insensitive name followed by `key=value`
//! arguments; values may be wrapped in double quotes:
//!
//! ```text
//! LoadMap name="Grid12x12"
//! SetFocusedHex hexCoords="3,4"
//! Move hexCoords="3,5"
//! EndTurn
//! ```

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single request to the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    LoadMap { name: String },
    PlayerReady,
    SetFocusedHex(HexCoord),
    SelectFocusedUnit,
    Move(HexCoord),
    Stay,
    HoldFire,
    Attack,
    Cancel,
    EndTurn,
    PlayerQuit,
    /// A well-formed line whose name is not part of the vocabulary.
    Unrecognized(String),
}

/// Where a command came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Local,
    Remote,
}

/// Result of applying a well-formed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The command changed game state.
    Applied,
    /// The command was legal to send but had no effect here.
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Malformed command lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),

    #[error("expected key=value, found `{0}`")]
    MalformedArgument(String),

    #[error("{command} requires argument `{argument}`")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: invalid value `{value}` for `{argument}`")]
    InvalidArgument {
        command: &'static str,
        argument: &'static str,
        value: String,
    },
}

impl Command {
    /// Parse one command line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (line, ""),
        };
        let args = parse_arguments(rest)?;

        let command = match name.to_ascii_lowercase().as_str() {
            "loadmap" => Command::LoadMap {
                name: require(&args, "LoadMap", "name")?.to_string(),
            },
            "playerready" => Command::PlayerReady,
            "setfocusedhex" => Command::SetFocusedHex(hex_argument(&args, "SetFocusedHex")?),
            "selectfocusedunit" => Command::SelectFocusedUnit,
            "move" => Command::Move(hex_argument(&args, "Move")?),
            "stay" => Command::Stay,
            "holdfire" => Command::HoldFire,
            "attack" => Command::Attack,
            "cancel" => Command::Cancel,
            "endturn" => Command::EndTurn,
            "playerquit" => Command::PlayerQuit,
            _ => Command::Unrecognized(line.to_string()),
        };
        Ok(command)
    }

    /// Commands that act on the current player's turn.
    pub fn is_turn_action(&self) -> bool {
        matches!(
            self,
            Command::SetFocusedHex(_)
                | Command::SelectFocusedUnit
                | Command::Move(_)
                | Command::Stay
                | Command::HoldFire
                | Command::Attack
                | Command::Cancel
                | Command::EndTurn
        )
    }

    /// Whether the command should be mirrored to the network peer when
    /// issued locally.
    pub fn is_shared(&self) -> bool {
        self.is_turn_action() || matches!(self, Command::PlayerReady | Command::PlayerQuit)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::LoadMap { name } => write!(f, "LoadMap name=\"{name}\""),
            Command::PlayerReady => write!(f, "PlayerReady"),
            Command::SetFocusedHex(c) => {
                write!(f, "SetFocusedHex hexCoords=\"{}\"", c.to_command_string())
            }
            Command::SelectFocusedUnit => write!(f, "SelectFocusedUnit"),
            Command::Move(c) => write!(f, "Move hexCoords=\"{}\"", c.to_command_string()),
            Command::Stay => write!(f, "Stay"),
            Command::HoldFire => write!(f, "HoldFire"),
            Command::Attack => write!(f, "Attack"),
            Command::Cancel => write!(f, "Cancel"),
            Command::EndTurn => write!(f, "EndTurn"),
            Command::PlayerQuit => write!(f, "PlayerQuit"),
            Command::Unrecognized(line) => write!(f, "{line}"),
        }
    }
}

fn parse_arguments(input: &str) -> Result<Vec<(String, String)>, CommandError> {
    let mut args = Vec::new();
    let mut chars = input.trim().chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        if chars.next_if_eq(&'=').is_none() || key.is_empty() {
            return Err(CommandError::MalformedArgument(key));
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => value.push(c),
                    None => return Err(CommandError::UnterminatedQuote(input.to_string())),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                value.push(c);
            }
        }
        args.push((key, value));
    }

    Ok(args)
}

fn require<'a>(
    args: &'a [(String, String)],
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    args.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(argument))
        .map(|(_, value)| value.as_str())
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn hex_argument(args: &[(String, String)], command: &'static str) -> Result<HexCoord, CommandError> {
    let value = require(args, command, "hexCoords")?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        argument: "hexCoords",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("EndTurn").unwrap(), Command::EndTurn);
        assert_eq!(Command::parse("  attack ").unwrap(), Command::Attack);
        assert_eq!(Command::parse("HOLDFIRE").unwrap(), Command::HoldFire);
        assert_eq!("PlayerQuit".parse::<Command>().unwrap(), Command::PlayerQuit);
    }

    #[test]
    fn test_parse_hex_arguments() {
        assert_eq!(
            Command::parse("Move hexCoords=\"3,5\"").unwrap(),
            Command::Move(HexCoord::new(3, 5))
        );
        assert_eq!(
            Command::parse("SetFocusedHex hexcoords=2,7").unwrap(),
            Command::SetFocusedHex(HexCoord::new(2, 7))
        );
    }

    #[test]
    fn test_parse_load_map_with_spaces() {
        assert_eq!(
            Command::parse("LoadMap name=\"Big Map\"").unwrap(),
            Command::LoadMap {
                name: "Big Map".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_keeps_line() {
        assert_eq!(
            Command::parse("Dance style=tango").unwrap(),
            Command::Unrecognized("Dance style=tango".to_string())
        );
    }

    #[test]
    fn test_malformed_arguments() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("Move"),
            Err(CommandError::MissingArgument {
                command: "Move",
                argument: "hexCoords"
            })
        );
        assert!(matches!(
            Command::parse("Move hexCoords=\"a,b\""),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Command::parse("Move hexCoords=\"1,2"),
            Err(CommandError::UnterminatedQuote(_))
        ));
        assert!(matches!(
            Command::parse("Move hexCoords"),
            Err(CommandError::MalformedArgument(_))
        ));
    }

    #[test]
    fn test_display_is_parseable() {
        let commands = [
            Command::LoadMap {
                name: "Grid12x12".into(),
            },
            Command::SetFocusedHex(HexCoord::new(4, 1)),
            Command::Move(HexCoord::new(0, 11)),
            Command::SelectFocusedUnit,
            Command::EndTurn,
        ];
        for command in commands {
            assert_eq!(Command::parse(&command.to_string()).unwrap(), command);
        }
        assert_eq!(Command::Move(HexCoord::new(3, 5)).to_string(), "Move hexCoords=\"3,5\"");
    }

    #[test]
    fn test_turn_action_classification() {
        assert!(Command::Attack.is_turn_action());
        assert!(!Command::PlayerReady.is_turn_action());
        assert!(Command::PlayerReady.is_shared());
        assert!(!Command::LoadMap { name: "x".into() }.is_shared());
    }
}
