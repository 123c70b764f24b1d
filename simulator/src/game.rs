//! Rules of the water fight: hidden forts on a square grid, the player
//! soaks cells, and every fort still standing scores back after each shot.

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;
use waterfight_types::{BoardSnapshot, CellState, Location, OpponentInfo, ScoreBoardInfo};

pub const FORT_SIZE: usize = 5;
pub const WINNING_SCORE: u64 = 2500;
const MAX_PLACEMENT_ATTEMPTS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unable to place fort {0}")]
    Placement(char),
    #[error("location {0} is outside the board")]
    OutOfBounds(Location),
    #[error("game is over")]
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    InProgress,
    PlayerWon,
    OpponentsWon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unshot,
    Hit,
    Miss,
}

#[derive(Clone, Copy, Debug)]
struct Square {
    fort: Option<usize>,
    mark: Mark,
}

#[derive(Clone, Debug)]
struct Fort {
    id: char,
    cells: Vec<(usize, usize)>,
    undamaged: usize,
}

impl Fort {
    /// Points this fort scores when it fires.
    fn points(&self) -> u64 {
        match self.undamaged {
            5 | 4 => 20,
            3 => 5,
            2 => 2,
            1 => 1,
            _ => 0,
        }
    }

    fn is_destroyed(&self) -> bool {
        self.undamaged == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShotResult {
    pub is_hit: bool,
    pub was_already_shot: bool,
    /// Non-zero scores of the opponents that fired back.
    pub opponent_scores: Vec<u64>,
    pub state: GameState,
}

#[derive(Clone, Debug)]
pub struct Game {
    size: usize,
    squares: Vec<Vec<Square>>,
    forts: Vec<Fort>,
    score_history: Vec<u64>,
    total_score: u64,
    state: GameState,
}

impl Game {
    /// Create a `size` x `size` game with one fort per opponent.
    pub fn new<R: Rng>(rng: &mut R, size: usize, opponents: usize) -> Result<Self, GameError> {
        let mut game = Self {
            size,
            squares: vec![
                vec![
                    Square {
                        fort: None,
                        mark: Mark::Unshot,
                    };
                    size
                ];
                size
            ],
            forts: Vec::with_capacity(opponents),
            score_history: Vec::new(),
            total_score: 0,
            state: GameState::InProgress,
        };

        for index in 0..opponents {
            let id = (b'A' + (index % 26) as u8) as char;
            let cells = (0..MAX_PLACEMENT_ATTEMPTS)
                .find_map(|_| game.grow_fort(rng))
                .ok_or(GameError::Placement(id))?;
            for &(row, col) in &cells {
                game.squares[row][col].fort = Some(index);
            }
            game.forts.push(Fort {
                id,
                cells,
                undamaged: FORT_SIZE,
            });
        }
        Ok(game)
    }

    /// Grow a connected shape of `FORT_SIZE` free cells from a random start.
    fn grow_fort<R: Rng>(&self, rng: &mut R) -> Option<Vec<(usize, usize)>> {
        if self.size == 0 {
            return None;
        }
        let start = (rng.gen_range(0..self.size), rng.gen_range(0..self.size));
        if self.squares[start.0][start.1].fort.is_some() {
            return None;
        }

        let mut cells = vec![start];
        while cells.len() < FORT_SIZE {
            let frontier: Vec<_> = cells
                .iter()
                .flat_map(|&(row, col)| self.neighbours(row, col))
                .filter(|cell| !cells.contains(cell) && self.squares[cell.0][cell.1].fort.is_none())
                .collect();
            cells.push(*frontier.choose(rng)?);
        }
        Some(cells)
    }

    fn neighbours(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let offsets: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        offsets.into_iter().filter_map(move |(dr, dc)| {
            let row = row.checked_add_signed(dr)?;
            let col = col.checked_add_signed(dc)?;
            (row < self.size && col < self.size).then_some((row, col))
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state != GameState::InProgress
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn active_forts(&self) -> usize {
        self.forts.iter().filter(|fort| !fort.is_destroyed()).count()
    }

    /// Cells of every fort, in placement order.
    pub fn fort_cells(&self) -> Vec<Location> {
        self.forts
            .iter()
            .flat_map(|fort| fort.cells.iter())
            .map(|&(row, col)| Location::new(row as i64, col as i64))
            .collect()
    }

    /// Shoot at `location`, let the opponents fire back, then settle the
    /// game state. A win is checked before a loss.
    pub fn shoot(&mut self, location: Location) -> Result<ShotResult, GameError> {
        if !location.is_within(self.size, self.size) {
            return Err(GameError::OutOfBounds(location));
        }
        if self.is_over() {
            return Err(GameError::GameOver);
        }

        let (row, col) = (location.row as usize, location.col as usize);
        let square = &mut self.squares[row][col];
        let was_already_shot = square.mark != Mark::Unshot;
        let fort = square.fort;
        square.mark = if fort.is_some() { Mark::Hit } else { Mark::Miss };

        if let (Some(index), false) = (fort, was_already_shot) {
            let fort = &mut self.forts[index];
            fort.undamaged = fort.undamaged.saturating_sub(1);
        }

        let opponent_scores: Vec<u64> = self
            .forts
            .iter()
            .filter(|fort| !fort.is_destroyed())
            .map(Fort::points)
            .filter(|&points| points > 0)
            .collect();
        let volley: u64 = opponent_scores.iter().sum();
        if volley > 0 {
            self.total_score += volley;
            self.score_history.push(volley);
        }

        if self.forts.iter().all(Fort::is_destroyed) {
            self.state = GameState::PlayerWon;
        } else if self.total_score >= WINNING_SCORE {
            self.state = GameState::OpponentsWon;
        }

        Ok(ShotResult {
            is_hit: fort.is_some(),
            was_already_shot,
            opponent_scores,
            state: self.state,
        })
    }

    /// The board as the player sees it; `reveal` exposes unshot cells.
    pub fn board(&self, reveal: bool) -> BoardSnapshot {
        let cell_states = self
            .squares
            .iter()
            .map(|row| {
                row.iter()
                    .map(|square| match (square.mark, reveal, square.fort) {
                        (Mark::Hit, _, _) => CellState::Hit,
                        (Mark::Miss, _, _) => CellState::Miss,
                        (Mark::Unshot, false, _) => CellState::Fog,
                        (Mark::Unshot, true, Some(_)) => CellState::Fort,
                        (Mark::Unshot, true, None) => CellState::Field,
                    })
                    .collect()
            })
            .collect();
        BoardSnapshot::new(cell_states)
    }

    pub fn opponents(&self) -> Vec<OpponentInfo> {
        self.forts
            .iter()
            .enumerate()
            .map(|(index, fort)| OpponentInfo {
                opponent_id: format!("#{}", index + 1),
                fort_id: fort.id.to_string(),
                undamaged_cell_count: fort.undamaged,
                total_cell_count: fort.cells.len(),
                is_destroyed: fort.is_destroyed(),
            })
            .collect()
    }

    pub fn scoreboard(&self) -> ScoreBoardInfo {
        ScoreBoardInfo {
            total_score: self.total_score,
            winning_score: WINNING_SCORE,
            points_needed_to_win: WINNING_SCORE.saturating_sub(self.total_score),
            turn_count: self.score_history.len(),
        }
    }
}
