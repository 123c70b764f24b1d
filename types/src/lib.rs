pub mod api;
pub use api::{CheatCommand, Location};
pub mod board;
pub use board::{BoardSnapshot, Cell, CellState};
pub mod game;
pub use game::{GameNumber, GameSummary, OpponentInfo, ScoreBoardInfo};

/// Width and height of the board served by the reference server.
pub const DEFAULT_BOARD_SIZE: usize = 10;
