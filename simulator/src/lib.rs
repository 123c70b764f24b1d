use rand::{rngs::StdRng, SeedableRng};
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::RwLock;
use waterfight_types::{
    BoardSnapshot, CheatCommand, GameNumber, GameSummary, Location, OpponentInfo, ScoreBoardInfo,
    DEFAULT_BOARD_SIZE,
};

mod api;
pub use api::Api;

pub mod game;
use game::{Game, GameError, GameState};

pub const DEFAULT_OPPONENTS: usize = 5;
pub const DEFAULT_AUTHOR: &str = "Water Fight Simulator";

#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    pub num_opponents: usize,
    pub board_size: usize,
    /// Text served by `GET /api/about`.
    pub author: String,
    /// Seed for fort placement; games are random when unset.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            num_opponents: DEFAULT_OPPONENTS,
            board_size: DEFAULT_BOARD_SIZE,
            author: DEFAULT_AUTHOR.to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("no game with number {0}")]
    GameNotFound(GameNumber),
    #[error("unknown cheat: {0}")]
    UnknownCheat(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

struct Record {
    game: Game,
    reveal: bool,
    last_opponent_points: Vec<u64>,
}

impl Record {
    fn summary(&self, game_number: GameNumber) -> GameSummary {
        let mut summary = GameSummary::new(game_number);
        summary.is_game_won = self.game.state() == GameState::PlayerWon;
        summary.is_game_lost = self.game.state() == GameState::OpponentsWon;
        summary.opponent_points = self.game.total_score();
        summary.num_active_opponent_forts = self.game.active_forts() as u64;
        summary.last_opponent_points = self.last_opponent_points.clone();
        summary
    }
}

/// In-memory game server. Game numbers are indices into `games`.
pub struct Simulator {
    pub config: SimulatorConfig,
    rng: Mutex<StdRng>,
    games: RwLock<Vec<Record>>,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
            games: RwLock::new(Vec::new()),
        }
    }

    pub fn about(&self) -> &str {
        &self.config.author
    }

    pub async fn create_game(&self) -> Result<GameSummary, SimulatorError> {
        let game = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Game::new(&mut *rng, self.config.board_size, self.config.num_opponents)?
        };
        let mut games = self.games.write().await;
        let game_number = games.len() as GameNumber;
        let record = Record {
            game,
            reveal: false,
            last_opponent_points: Vec::new(),
        };
        let summary = record.summary(game_number);
        games.push(record);
        tracing::info!(game_number, "game created");
        Ok(summary)
    }

    pub async fn games(&self) -> Vec<GameSummary> {
        self.games
            .read()
            .await
            .iter()
            .enumerate()
            .map(|(index, record)| record.summary(index as GameNumber))
            .collect()
    }

    pub async fn game(&self, game_number: GameNumber) -> Result<GameSummary, SimulatorError> {
        self.read(game_number, |record| record.summary(game_number))
            .await
    }

    pub async fn board(&self, game_number: GameNumber) -> Result<BoardSnapshot, SimulatorError> {
        self.read(game_number, |record| record.game.board(record.reveal))
            .await
    }

    pub async fn opponents(
        &self,
        game_number: GameNumber,
    ) -> Result<Vec<OpponentInfo>, SimulatorError> {
        self.read(game_number, |record| record.game.opponents())
            .await
    }

    pub async fn scoreboard(
        &self,
        game_number: GameNumber,
    ) -> Result<ScoreBoardInfo, SimulatorError> {
        self.read(game_number, |record| record.game.scoreboard())
            .await
    }

    /// Apply a cheat sent as raw body text. Only `SHOW_ALL` is known.
    pub async fn cheat(&self, game_number: GameNumber, raw: &str) -> Result<(), SimulatorError> {
        let mut games = self.games.write().await;
        let record = lookup(&mut games, game_number)?;
        match raw.parse::<CheatCommand>() {
            Ok(CheatCommand::ShowAll) => {
                record.reveal = true;
                tracing::info!(game_number, "cheat applied: board revealed");
                Ok(())
            }
            Err(err) => Err(SimulatorError::UnknownCheat(err.0)),
        }
    }

    pub async fn shoot(
        &self,
        game_number: GameNumber,
        location: Location,
    ) -> Result<GameSummary, SimulatorError> {
        let mut games = self.games.write().await;
        let record = lookup(&mut games, game_number)?;
        let shot = record.game.shoot(location)?;
        tracing::debug!(
            game_number,
            %location,
            hit = shot.is_hit,
            repeat = shot.was_already_shot,
            "shot resolved"
        );
        record.last_opponent_points = shot.opponent_scores;
        Ok(record.summary(game_number))
    }

    async fn read<T>(
        &self,
        game_number: GameNumber,
        view: impl FnOnce(&Record) -> T,
    ) -> Result<T, SimulatorError> {
        let games = self.games.read().await;
        usize::try_from(game_number)
            .ok()
            .and_then(|index| games.get(index))
            .map(view)
            .ok_or(SimulatorError::GameNotFound(game_number))
    }
}

fn lookup(games: &mut [Record], game_number: GameNumber) -> Result<&mut Record, SimulatorError> {
    usize::try_from(game_number)
        .ok()
        .and_then(|index| games.get_mut(index))
        .ok_or(SimulatorError::GameNotFound(game_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterfight_types::CellState;

    fn simulator() -> Simulator {
        Simulator::new(SimulatorConfig {
            seed: Some(11),
            ..SimulatorConfig::default()
        })
    }

    #[tokio::test]
    async fn test_games_are_numbered_in_order() {
        let simulator = simulator();
        let first = simulator.create_game().await.unwrap();
        let second = simulator.create_game().await.unwrap();
        assert_eq!(first.game_number, 0);
        assert_eq!(second.game_number, 1);
        assert_eq!(first.num_active_opponent_forts, 5);
        assert_eq!(simulator.games().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let simulator = simulator();
        assert_eq!(
            simulator.board(7).await.unwrap_err(),
            SimulatorError::GameNotFound(7)
        );
        assert_eq!(
            simulator.cheat(7, "SHOW_ALL").await.unwrap_err(),
            SimulatorError::GameNotFound(7)
        );
    }

    #[tokio::test]
    async fn test_cheat_reveals_board() {
        let simulator = simulator();
        let game = simulator.create_game().await.unwrap();
        assert_eq!(
            simulator.cheat(game.game_number, "NoSuchCheat").await.unwrap_err(),
            SimulatorError::UnknownCheat("NoSuchCheat".into())
        );
        simulator.cheat(game.game_number, "\"SHOW_ALL\"\n").await.unwrap();
        let board = simulator.board(game.game_number).await.unwrap();
        assert_eq!(board.count(CellState::Fort), 25);
    }

    #[tokio::test]
    async fn test_shoot_updates_summary() {
        let simulator = simulator();
        let game = simulator.create_game().await.unwrap();
        let summary = simulator
            .shoot(game.game_number, Location::new(0, 0))
            .await
            .unwrap();
        assert!(summary.opponent_points > 0);
        assert!(!summary.last_opponent_points.is_empty());
        assert_eq!(simulator.scoreboard(game.game_number).await.unwrap().turn_count, 1);
        assert!(matches!(
            simulator.shoot(game.game_number, Location::new(10, 0)).await,
            Err(SimulatorError::Game(GameError::OutOfBounds(_)))
        ));
    }

    #[tokio::test]
    async fn test_seed_reproduces_forts() {
        let a = simulator();
        let b = simulator();
        a.create_game().await.unwrap();
        b.create_game().await.unwrap();
        a.cheat(0, "SHOW_ALL").await.unwrap();
        b.cheat(0, "SHOW_ALL").await.unwrap();
        assert_eq!(a.board(0).await.unwrap(), b.board(0).await.unwrap());
    }
}
