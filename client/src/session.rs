//! Single source of truth for what the client currently shows.
//!
//! Every fetch takes a [`Ticket`] when it is issued. Responses are applied
//! through the `apply_*` methods, which drop anything superseded by a
//! later-issued fetch or addressed to a game that is no longer held.

use std::sync::{Mutex, MutexGuard};
use waterfight_types::{BoardSnapshot, GameNumber, GameSummary};

/// Issue order of a fetch. Later tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Default)]
struct Inner {
    author: Option<String>,
    game: Option<GameSummary>,
    board: Option<BoardSnapshot>,
    issued: u64,
    created: u64,
    game_applied: u64,
    board_applied: u64,
}

#[derive(Default)]
pub struct SessionState {
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Writes are single assignments; a poisoned record is still whole.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn game(&self) -> Option<GameSummary> {
        self.lock().game.clone()
    }

    pub fn board(&self) -> Option<BoardSnapshot> {
        self.lock().board.clone()
    }

    pub fn author(&self) -> Option<String> {
        self.lock().author.clone()
    }

    pub fn game_number(&self) -> Option<GameNumber> {
        self.lock().game.as_ref().map(|game| game.game_number)
    }

    pub fn set_game(&self, game: GameSummary) {
        self.lock().game = Some(game);
    }

    pub fn set_board(&self, board: BoardSnapshot) {
        self.lock().board = Some(board);
    }

    pub fn set_author(&self, author: String) {
        self.lock().author = Some(author);
    }

    pub fn issue(&self) -> Ticket {
        let mut inner = self.lock();
        inner.issued += 1;
        Ticket(inner.issued)
    }

    /// Apply a freshly created game. Returns false if a game created by a
    /// later request is already held.
    pub fn apply_created(&self, ticket: Ticket, game: GameSummary) -> bool {
        let mut inner = self.lock();
        if ticket.0 <= inner.created {
            return false;
        }
        inner.created = ticket.0;
        inner.game_applied = inner.game_applied.max(ticket.0);
        inner.game = Some(game);
        true
    }

    /// Apply a refreshed game fetched for `game_number`.
    pub fn apply_game(&self, ticket: Ticket, game_number: GameNumber, game: GameSummary) -> bool {
        let mut inner = self.lock();
        let current = inner.game.as_ref().map(|game| game.game_number);
        if current != Some(game_number) || ticket.0 <= inner.game_applied {
            return false;
        }
        inner.game_applied = ticket.0;
        inner.game = Some(game);
        true
    }

    /// Apply a board fetched for `game_number`.
    pub fn apply_board(
        &self,
        ticket: Ticket,
        game_number: GameNumber,
        board: BoardSnapshot,
    ) -> bool {
        let mut inner = self.lock();
        let current = inner.game.as_ref().map(|game| game.game_number);
        if current != Some(game_number) || ticket.0 <= inner.board_applied {
            return false;
        }
        inner.board_applied = ticket.0;
        inner.board = Some(board);
        true
    }
}
