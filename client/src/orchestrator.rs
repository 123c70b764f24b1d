use crate::classify::{check_status, Failure};
use crate::notify::{Notifier, SoundCue};
use crate::session::SessionState;
use crate::transport::{Encoding, Payload, Request, RequestOutcome, Transport};
use futures::join;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use waterfight_types::{
    api::paths, BoardSnapshot, CheatCommand, GameNumber, GameSummary, Location,
};

const OP_ABOUT: &str = "GET about";
const OP_NEW_GAME: &str = "POST games";
const OP_GAME: &str = "GET Game";
const OP_BOARD: &str = "GET board";
const OP_CHEAT: &str = "POST Show All Cheat";
const OP_MOVE: &str = "POST moves";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_ACCEPTED: u16 = 202;

/// Why an action was not attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// No game has been created yet.
    NoActiveGame,
    /// The held game is already won or lost.
    GameOver,
}

/// What an action did to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Updated,
    /// The response was superseded by a later fetch and was dropped.
    Stale,
    Skipped(Skip),
    Failed(Failure),
}

impl Outcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Outcome::Updated)
    }

    /// Combine the outcomes of two refreshes that together form one step.
    fn and(self, other: Outcome) -> Outcome {
        match (self, other) {
            (failed @ Outcome::Failed(_), _) | (_, failed @ Outcome::Failed(_)) => failed,
            (Outcome::Updated, _) | (_, Outcome::Updated) => Outcome::Updated,
            (first, _) => first,
        }
    }
}

/// Drives one game session against the server.
///
/// State is only ever written from successful responses; failures are
/// handled here and reported through the returned [`Outcome`] and the
/// notifier, never propagated.
pub struct Session<T, N> {
    transport: T,
    notifier: N,
    state: SessionState,
}

impl<T: Transport, N: Notifier> Session<T, N> {
    pub fn new(transport: T, notifier: N) -> Self {
        Self {
            transport,
            notifier,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Fetch the author text shown in the page header.
    pub async fn load_about(&self) -> Outcome {
        let request = Request::get(paths::about()).with_encoding(Encoding::PlainText);
        match self.transport.send(request).await {
            RequestOutcome::Success { status, body } => {
                check_status(&self.notifier, OP_ABOUT, STATUS_OK, status);
                let author = body.as_text().unwrap_or_default();
                debug!(%author, "loaded about");
                self.state.set_author(author);
                Outcome::Updated
            }
            RequestOutcome::Failure { status, body } => {
                self.failed(OP_ABOUT, Failure::from_status(status, body.as_ref()))
            }
        }
    }

    /// Create a game, hold it, then load its board.
    pub async fn new_game(&self) -> Outcome {
        let ticket = self.state.issue();
        match self.transport.send(Request::post(paths::games())).await {
            RequestOutcome::Success { status, body } => {
                check_status(&self.notifier, OP_NEW_GAME, STATUS_CREATED, status);
                let game: GameSummary = match decode(&body) {
                    Ok(game) => game,
                    Err(failure) => return self.failed(OP_NEW_GAME, failure),
                };
                let game_number = game.game_number;
                if !self.state.apply_created(ticket, game) {
                    debug!(game_number, "dropping superseded game creation");
                    return Outcome::Stale;
                }
                info!(game_number, "created game");
                self.load_board_for(game_number).await;
                Outcome::Updated
            }
            RequestOutcome::Failure { status, body } => {
                self.failed(OP_NEW_GAME, Failure::from_status(status, body.as_ref()))
            }
        }
    }

    pub async fn load_game(&self) -> Outcome {
        match self.state.game_number() {
            Some(game_number) => self.load_game_for(game_number).await,
            None => skipped(OP_GAME, Skip::NoActiveGame),
        }
    }

    pub async fn load_board(&self) -> Outcome {
        match self.state.game_number() {
            Some(game_number) => self.load_board_for(game_number).await,
            None => skipped(OP_BOARD, Skip::NoActiveGame),
        }
    }

    /// Ask the server to reveal every cell, then reload the board. The cheat
    /// response itself carries no state.
    pub async fn reveal_all(&self) -> Outcome {
        let Some(game_number) = self.state.game_number() else {
            return skipped(OP_CHEAT, Skip::NoActiveGame);
        };
        let request = Request::post(paths::cheat_state(game_number))
            .with_text(CheatCommand::ShowAll.as_str());
        match self.transport.send(request).await {
            RequestOutcome::Success { status, .. } => {
                check_status(&self.notifier, OP_CHEAT, STATUS_ACCEPTED, status);
                info!(game_number, "revealed board");
                self.load_board_for(game_number).await
            }
            RequestOutcome::Failure { status, body } => {
                self.failed(OP_CHEAT, Failure::from_status(status, body.as_ref()))
            }
        }
    }

    /// Shoot at `location`. Nothing is sent once the held game is over.
    ///
    /// On success the board and the game are refreshed concurrently and the
    /// call resolves once both have completed.
    pub async fn submit_move(&self, location: Location) -> Outcome {
        let Some(game) = self.state.game() else {
            return skipped(OP_MOVE, Skip::NoActiveGame);
        };
        if game.is_over() {
            info!(%location, "unable to make move after game has ended");
            return Outcome::Skipped(Skip::GameOver);
        }

        let game_number = game.game_number;
        debug!(game_number, %location, "submitting move");
        let request = Request::post(paths::moves(game_number)).with_json(&location);
        match self.transport.send(request).await {
            RequestOutcome::Success { status, .. } => {
                debug!(game_number, status, "move accepted");
                let (board, game) = join!(
                    self.load_board_for(game_number),
                    self.load_game_for(game_number)
                );
                board.and(game)
            }
            RequestOutcome::Failure { status, body } => {
                match Failure::from_move_status(status, body.as_ref()) {
                    illegal @ Failure::IllegalMove { .. } => {
                        info!(game_number, %location, "move rejected: hit the wall");
                        self.notifier.play_sound(SoundCue::IllegalMove);
                        Outcome::Failed(illegal)
                    }
                    failure => self.failed(OP_MOVE, failure),
                }
            }
        }
    }

    async fn load_game_for(&self, game_number: GameNumber) -> Outcome {
        let ticket = self.state.issue();
        match self.transport.send(Request::get(paths::game(game_number))).await {
            RequestOutcome::Success { status, body } => {
                check_status(&self.notifier, OP_GAME, STATUS_OK, status);
                let game: GameSummary = match decode(&body) {
                    Ok(game) => game,
                    Err(failure) => return self.failed(OP_GAME, failure),
                };
                if !self.state.apply_game(ticket, game_number, game) {
                    debug!(game_number, "dropping superseded game refresh");
                    return Outcome::Stale;
                }
                Outcome::Updated
            }
            RequestOutcome::Failure { status, body } => {
                self.failed(OP_GAME, Failure::from_status(status, body.as_ref()))
            }
        }
    }

    async fn load_board_for(&self, game_number: GameNumber) -> Outcome {
        let ticket = self.state.issue();
        match self.transport.send(Request::get(paths::board(game_number))).await {
            RequestOutcome::Success { status, body } => {
                check_status(&self.notifier, OP_BOARD, STATUS_OK, status);
                let board: BoardSnapshot = match decode(&body) {
                    Ok(board) => board,
                    Err(failure) => return self.failed(OP_BOARD, failure),
                };
                if !self.state.apply_board(ticket, game_number, board) {
                    debug!(game_number, "dropping superseded board refresh");
                    return Outcome::Stale;
                }
                Outcome::Updated
            }
            RequestOutcome::Failure { status, body } => {
                self.failed(OP_BOARD, Failure::from_status(status, body.as_ref()))
            }
        }
    }

    fn failed(&self, operation: &'static str, failure: Failure) -> Outcome {
        warn!(operation, status = ?failure.status(), error = %failure, "request failed");
        Outcome::Failed(failure)
    }
}

fn skipped(operation: &'static str, reason: Skip) -> Outcome {
    debug!(operation, ?reason, "skipping request");
    Outcome::Skipped(reason)
}

fn decode<T: DeserializeOwned>(body: &Payload) -> Result<T, Failure> {
    body.decode().map_err(|err| Failure::Decode {
        reason: err.to_string(),
    })
}
