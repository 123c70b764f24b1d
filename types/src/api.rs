use crate::GameNumber;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Prefix shared by every game server route.
pub const API_PREFIX: &str = "api";

/// Paths of the game server API, relative to the server's base URL.
pub mod paths {
    use super::API_PREFIX;
    use crate::GameNumber;

    pub fn about() -> String {
        format!("{API_PREFIX}/about")
    }

    pub fn games() -> String {
        format!("{API_PREFIX}/games")
    }

    pub fn game(game_number: GameNumber) -> String {
        format!("{API_PREFIX}/games/{game_number}")
    }

    pub fn board(game_number: GameNumber) -> String {
        format!("{API_PREFIX}/games/{game_number}/board")
    }

    pub fn cheat_state(game_number: GameNumber) -> String {
        format!("{API_PREFIX}/games/{game_number}/cheatstate")
    }

    pub fn moves(game_number: GameNumber) -> String {
        format!("{API_PREFIX}/games/{game_number}/moves")
    }
}

/// A move target. Coordinates are signed so that out-of-range shots can be
/// expressed; the server decides what is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: i64,
    pub col: i64,
}

impl Location {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Returns true when the location addresses a cell of a `width` x `height` board.
    pub fn is_within(&self, width: usize, height: usize) -> bool {
        let in_range = |value: i64, bound: usize| {
            usize::try_from(value).map(|v| v < bound).unwrap_or(false)
        };
        in_range(self.row, height) && in_range(self.col, width)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cheat commands understood by the server's `cheatstate` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheatCommand {
    ShowAll,
}

impl CheatCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheatCommand::ShowAll => "SHOW_ALL",
        }
    }
}

impl fmt::Display for CheatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cheat command: {0:?}")]
pub struct UnknownCheat(pub String);

impl FromStr for CheatCommand {
    type Err = UnknownCheat;

    /// Accepts the command with surrounding whitespace and an optional pair
    /// of double quotes, as clients that JSON-encode the keyword send it.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(trimmed);
        match unquoted {
            "SHOW_ALL" => Ok(CheatCommand::ShowAll),
            other => Err(UnknownCheat(other.to_string())),
        }
    }
}

/// Game numbers used by failure checks that must not match any server game.
pub const UNKNOWN_GAME: GameNumber = 2352523;
pub const UNKNOWN_MOVE_GAME: GameNumber = 235235;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(paths::about(), "api/about");
        assert_eq!(paths::games(), "api/games");
        assert_eq!(paths::game(42), "api/games/42");
        assert_eq!(paths::board(42), "api/games/42/board");
        assert_eq!(paths::cheat_state(42), "api/games/42/cheatstate");
        assert_eq!(paths::moves(42), "api/games/42/moves");
    }

    #[test]
    fn test_cheat_command_parsing() {
        assert_eq!("SHOW_ALL".parse(), Ok(CheatCommand::ShowAll));
        assert_eq!("  SHOW_ALL\n".parse(), Ok(CheatCommand::ShowAll));
        assert_eq!("\"SHOW_ALL\"".parse(), Ok(CheatCommand::ShowAll));
        assert_eq!(
            "NoSuchCheat".parse::<CheatCommand>(),
            Err(UnknownCheat("NoSuchCheat".to_string()))
        );
        assert!("show_all".parse::<CheatCommand>().is_err());
        assert!("\"SHOW_ALL".parse::<CheatCommand>().is_err());
    }

    #[test]
    fn test_location_wire_format() {
        let json = serde_json::to_value(Location::new(-1, 3)).unwrap();
        assert_eq!(json, serde_json::json!({"row": -1, "col": 3}));
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location::new(0, 0).is_within(10, 10));
        assert!(Location::new(9, 9).is_within(10, 10));
        assert!(!Location::new(-1, 3).is_within(10, 10));
        assert!(!Location::new(3, 10).is_within(10, 10));
        assert!(!Location::new(10, 3).is_within(10, 10));
    }
}
