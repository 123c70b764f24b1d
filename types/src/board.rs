use crate::Location;
use serde::{Deserialize, Serialize};

/// What the server reports for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// Not shot yet and not revealed.
    Fog,
    Hit,
    Miss,
    /// Unshot fort cell, only visible once the board is revealed.
    Fort,
    /// Unshot empty cell, only visible once the board is revealed.
    Field,
    #[serde(other)]
    Unknown,
}

impl CellState {
    pub fn is_revealed(&self) -> bool {
        !matches!(self, CellState::Fog)
    }
}

/// A cell together with its position: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub state: CellState,
}

impl Cell {
    pub fn location(&self) -> Location {
        Location::new(self.y as i64, self.x as i64)
    }

    pub fn is_revealed(&self) -> bool {
        self.state.is_revealed()
    }
}

/// The full grid as last served by the server, indexed `cell_states[row][col]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub board_width: usize,
    pub board_height: usize,
    pub cell_states: Vec<Vec<CellState>>,
}

impl BoardSnapshot {
    pub fn new(cell_states: Vec<Vec<CellState>>) -> Self {
        let board_height = cell_states.len();
        let board_width = cell_states.first().map(Vec::len).unwrap_or(0);
        Self {
            board_width,
            board_height,
            cell_states,
        }
    }

    pub fn state_at(&self, row: usize, col: usize) -> Option<CellState> {
        self.cell_states.get(row)?.get(col).copied()
    }

    /// Iterate over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cell_states.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, state)| Cell { x, y, state: *state })
        })
    }

    pub fn location_matches(cell: &Cell, x: usize, y: usize) -> bool {
        cell.x == x && cell.y == y
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells().filter(|cell| cell.state == state).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.cells().filter(Cell::is_revealed).count()
    }
}
