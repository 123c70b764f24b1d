//! Manual smoke tests of the server's error handling.
//!
//! Each check sends a deliberately invalid request and expects a specific
//! failure status. Only a mismatch raises an alert; passing checks are
//! logged.

use crate::notify::Notifier;
use crate::orchestrator::Session;
use crate::transport::{Request, RequestOutcome, Transport};
use std::fmt;
use tracing::{info, warn};
use waterfight_types::{
    api::{paths, UNKNOWN_GAME, UNKNOWN_MOVE_GAME},
    GameNumber, Location, DEFAULT_BOARD_SIZE,
};

const NOT_FOUND: u16 = 404;
const BAD_REQUEST: u16 = 400;

/// Result of one scripted check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    UnexpectedSuccess { expected: u16, actual: u16 },
    /// `actual` is `None` when no response was received.
    WrongStatus { expected: u16, actual: Option<u16> },
    /// The check needs a game and none is held.
    Skipped,
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub verdict: Verdict,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Passed => write!(f, "{}: ok", self.name),
            Verdict::UnexpectedSuccess { expected, actual } => write!(
                f,
                "{}: succeeded with {actual} (expected {expected})",
                self.name
            ),
            Verdict::WrongStatus {
                expected,
                actual: Some(actual),
            } => write!(f, "{}: got {actual} (expected {expected})", self.name),
            Verdict::WrongStatus {
                expected,
                actual: None,
            } => write!(f, "{}: no response (expected {expected})", self.name),
            Verdict::Skipped => write!(f, "{}: skipped (no game)", self.name),
        }
    }
}

/// Runs scripted failure checks through a session's transport and notifier.
pub struct Harness<'a, T, N> {
    session: &'a Session<T, N>,
}

impl<'a, T: Transport, N: Notifier> Harness<'a, T, N> {
    pub fn new(session: &'a Session<T, N>) -> Self {
        Self { session }
    }

    /// Send `request` and check that it fails with `expected`.
    pub async fn assert_fails(&self, name: &str, request: Request, expected: u16) -> Check {
        let outcome = self.session.transport().send(request).await;
        let verdict = match outcome {
            RequestOutcome::Success { status, .. } => {
                self.session.notifier().alert(&format!(
                    "{name}: Did *not* fail when it should have! (expected {expected})"
                ));
                Verdict::UnexpectedSuccess {
                    expected,
                    actual: status,
                }
            }
            RequestOutcome::Failure { status, body } if status != Some(expected) => {
                let actual = status.map_or_else(|| "no response".to_string(), |s| s.to_string());
                warn!(
                    check = name,
                    expected,
                    actual = %actual,
                    body = ?body,
                    "returned incorrect error response code"
                );
                self.session.notifier().alert(&format!(
                    "{name}: Returned incorrect error response code \
                     (expected {expected}, got {actual})"
                ));
                Verdict::WrongStatus {
                    expected,
                    actual: status,
                }
            }
            RequestOutcome::Failure { .. } => {
                info!(check = name, expected, "returned the correct response code");
                Verdict::Passed
            }
        };
        Check {
            name: name.to_string(),
            verdict,
        }
    }

    pub async fn check_bad_game(&self) -> Vec<Check> {
        vec![
            self.assert_fails(
                "Test Get Bad Game",
                Request::get(paths::game(UNKNOWN_GAME)),
                NOT_FOUND,
            )
            .await,
        ]
    }

    pub async fn check_bad_board(&self) -> Vec<Check> {
        vec![
            self.assert_fails(
                "Test Get Bad Board",
                Request::get(paths::board(UNKNOWN_GAME)),
                NOT_FOUND,
            )
            .await,
        ]
    }

    pub async fn check_bad_cheat(&self) -> Vec<Check> {
        let unknown_game = self.assert_fails(
            "Test Cheat on bad game",
            Request::post(paths::cheat_state(UNKNOWN_GAME)).with_text("1_CHEESE"),
            NOT_FOUND,
        );
        let bad_command = self.with_game("Test Bad cheat command", |game_number| {
            Request::post(paths::cheat_state(game_number)).with_text("NoSuchCheat")
        });
        let (unknown_game, bad_command) = futures::join!(unknown_game, bad_command);
        vec![unknown_game, bad_command]
    }

    pub async fn check_bad_move(&self) -> Vec<Check> {
        let width = self
            .session
            .state()
            .board()
            .map(|board| board.board_width)
            .unwrap_or(DEFAULT_BOARD_SIZE) as i64;

        let unknown_game = self.assert_fails(
            "Test Move on bad game",
            Request::post(paths::moves(UNKNOWN_MOVE_GAME)).with_json(&Location::new(3, 3)),
            NOT_FOUND,
        );
        let negative_row = self.with_game("Test Bad Move (row < 0)", |game_number| {
            Request::post(paths::moves(game_number)).with_json(&Location::new(-1, 3))
        });
        let wide_col = self.with_game("Test Bad Move (col >= width)", move |game_number| {
            Request::post(paths::moves(game_number)).with_json(&Location::new(3, width))
        });
        let (unknown_game, negative_row, wide_col) =
            futures::join!(unknown_game, negative_row, wide_col);
        vec![unknown_game, negative_row, wide_col]
    }

    /// Run every check group concurrently.
    pub async fn run_all(&self) -> Vec<Check> {
        let (game, board, cheat, moves) = futures::join!(
            self.check_bad_game(),
            self.check_bad_board(),
            self.check_bad_cheat(),
            self.check_bad_move()
        );
        [game, board, cheat, moves].into_iter().flatten().collect()
    }

    /// Run a check addressed to the held game. A check with no game to
    /// address is skipped without a request.
    async fn with_game<F>(&self, name: &str, build: F) -> Check
    where
        F: FnOnce(GameNumber) -> Request,
    {
        match self.session.state().game_number() {
            Some(game_number) => {
                self.assert_fails(name, build(game_number), BAD_REQUEST)
                    .await
            }
            None => {
                warn!(check = name, "no active game; skipping");
                Check {
                    name: name.to_string(),
                    verdict: Verdict::Skipped,
                }
            }
        }
    }
}
