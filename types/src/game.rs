use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned identifier of a game session.
pub type GameNumber = u64;

/// Session metadata reported by the server for one game.
///
/// Fields the client does not model are kept in `extra` so that a summary
/// can be replaced wholesale without losing server-reported data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_number: GameNumber,
    pub is_game_won: bool,
    pub is_game_lost: bool,
    #[serde(default)]
    pub opponent_points: u64,
    #[serde(default)]
    pub num_active_opponent_forts: u64,
    /// Points scored by each opponent on their last volley; empty before the
    /// first move.
    #[serde(default)]
    pub last_opponent_points: Vec<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameSummary {
    pub fn new(game_number: GameNumber) -> Self {
        Self {
            game_number,
            is_game_won: false,
            is_game_lost: false,
            opponent_points: 0,
            num_active_opponent_forts: 0,
            last_opponent_points: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.is_game_won || self.is_game_lost
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentInfo {
    pub opponent_id: String,
    pub fort_id: String,
    pub undamaged_cell_count: usize,
    pub total_cell_count: usize,
    pub is_destroyed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBoardInfo {
    pub total_score: u64,
    pub winning_score: u64,
    pub points_needed_to_win: u64,
    pub turn_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_wire_format() {
        let summary: GameSummary = serde_json::from_value(json!({
            "gameNumber": 42,
            "isGameWon": false,
            "isGameLost": true,
            "opponentPoints": 2510,
            "numActiveOpponentForts": 3,
            "lastOpponentPoints": [20, 5],
            "difficulty": "hard"
        }))
        .unwrap();

        assert_eq!(summary.game_number, 42);
        assert!(summary.is_over());
        assert_eq!(summary.last_opponent_points, vec![20, 5]);
        assert_eq!(summary.extra.get("difficulty"), Some(&json!("hard")));

        let encoded = serde_json::to_value(&summary).unwrap();
        assert_eq!(encoded["difficulty"], json!("hard"));
        assert_eq!(encoded["isGameLost"], json!(true));
    }

    #[test]
    fn test_summary_minimal() {
        let summary: GameSummary = serde_json::from_value(json!({
            "gameNumber": 42,
            "isGameWon": false,
            "isGameLost": false
        }))
        .unwrap();
        assert_eq!(summary, GameSummary::new(42));
        assert!(!summary.is_over());
    }
}
