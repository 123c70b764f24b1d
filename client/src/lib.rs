pub mod classify;
pub mod client;
pub mod harness;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod notify;
pub mod orchestrator;
pub mod session;
pub mod transport;

pub use classify::{check_status, Failure, StatusMismatch};
pub use client::Client;
pub use harness::{Check, Harness, Verdict};
pub use notify::{LogNotifier, Notifier, SoundCue};
pub use orchestrator::{Outcome, Session, Skip};
pub use session::SessionState;
pub use transport::{Encoding, Payload, Request, RequestOutcome, Transport};
use thiserror::Error;

/// Error type for client construction.
#[derive(Error, Debug)]
pub enum Error {
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingNotifier;
    use axum::Router;
    use std::{net::SocketAddr, sync::Arc};
    use tokio::time::{sleep, Duration};
    use waterfight_simulator::{Api, Simulator, SimulatorConfig};
    use waterfight_types::{CellState, Location};

    type TestSession = Session<Client, Arc<RecordingNotifier>>;

    struct TestContext {
        session: TestSession,
        notifier: Arc<RecordingNotifier>,
        server_handle: tokio::task::JoinHandle<()>,
    }

    impl TestContext {
        async fn new() -> Self {
            let simulator = Arc::new(Simulator::new(SimulatorConfig {
                seed: Some(42),
                author: "Test Author".into(),
                ..SimulatorConfig::default()
            }));
            let (base_url, server_handle) = serve_router(Api::new(simulator).router()).await;
            let notifier = Arc::new(RecordingNotifier::default());
            let session = Session::new(Client::new(&base_url).unwrap(), notifier.clone());
            Self {
                session,
                notifier,
                server_handle,
            }
        }

        fn cells(&self, state: CellState) -> Vec<Location> {
            self.session
                .state()
                .board()
                .unwrap()
                .cells()
                .filter(|cell| cell.state == state)
                .map(|cell| cell.location())
                .collect()
        }
    }

    impl Drop for TestContext {
        fn drop(&mut self) {
            self.server_handle.abort();
        }
    }

    async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let actual_addr = listener.local_addr().unwrap();
        let base_url = format!("http://{actual_addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .unwrap();
        });

        sleep(Duration::from_millis(50)).await;
        (base_url, handle)
    }

    #[test]
    fn test_client_invalid_scheme() {
        // Test invalid scheme
        let result = Client::new("ftp://example.com");
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(matches!(err, Error::InvalidScheme(_)));
            assert_eq!(
                err.to_string(),
                "invalid URL scheme: ftp (expected http or https)"
            );
        }

        // Test valid http scheme
        let result = Client::new("http://localhost:8080");
        assert!(result.is_ok());

        // Test valid https scheme
        let result = Client::new("https://localhost:8080");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_load_about() {
        let ctx = TestContext::new().await;
        assert_eq!(ctx.session.load_about().await, Outcome::Updated);
        assert_eq!(ctx.session.state().author().as_deref(), Some("Test Author"));
        assert!(ctx.notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_new_game_and_reveal() {
        let ctx = TestContext::new().await;
        assert_eq!(ctx.session.new_game().await, Outcome::Updated);
        let game = ctx.session.state().game().unwrap();
        assert_eq!(game.num_active_opponent_forts, 5);
        assert_eq!(ctx.cells(CellState::Fog).len(), 100);

        assert_eq!(ctx.session.reveal_all().await, Outcome::Updated);
        assert_eq!(ctx.cells(CellState::Fort).len(), 25);
        assert_eq!(ctx.cells(CellState::Field).len(), 75);
        assert!(ctx.notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_play_to_victory() {
        let ctx = TestContext::new().await;
        ctx.session.new_game().await;
        ctx.session.reveal_all().await;

        for location in ctx.cells(CellState::Fort) {
            assert_eq!(ctx.session.submit_move(location).await, Outcome::Updated);
        }
        let game = ctx.session.state().game().unwrap();
        assert!(game.is_game_won);
        assert!(!game.is_game_lost);
        assert_eq!(game.num_active_opponent_forts, 0);
        assert_eq!(ctx.cells(CellState::Hit).len(), 25);

        assert_eq!(
            ctx.session.submit_move(Location::new(0, 0)).await,
            Outcome::Skipped(Skip::GameOver)
        );
        assert!(ctx.notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_play_to_defeat() {
        let ctx = TestContext::new().await;
        ctx.session.new_game().await;
        ctx.session.reveal_all().await;

        let target = ctx.cells(CellState::Field)[0];
        for _ in 0..25 {
            assert_eq!(ctx.session.submit_move(target).await, Outcome::Updated);
        }
        let game = ctx.session.state().game().unwrap();
        assert!(game.is_game_lost);
        assert_eq!(game.opponent_points, 2500);
        assert_eq!(game.last_opponent_points, vec![20; 5]);

        assert_eq!(
            ctx.session.submit_move(target).await,
            Outcome::Skipped(Skip::GameOver)
        );
    }

    #[tokio::test]
    async fn test_illegal_move_plays_sound() {
        let ctx = TestContext::new().await;
        ctx.session.new_game().await;
        let before = ctx.session.state().board();

        let outcome = ctx.session.submit_move(Location::new(-1, 3)).await;
        assert_eq!(
            outcome,
            Outcome::Failed(Failure::IllegalMove { status: 400 })
        );
        assert_eq!(ctx.notifier.sounds(), vec![SoundCue::IllegalMove]);
        assert!(ctx.notifier.alerts().is_empty());
        assert_eq!(ctx.session.state().board(), before);
    }

    #[tokio::test]
    async fn test_harness_passes_against_simulator() {
        let ctx = TestContext::new().await;
        ctx.session.new_game().await;

        let checks = Harness::new(&ctx.session).run_all().await;
        assert_eq!(checks.len(), 7);
        for check in &checks {
            assert!(check.verdict.is_passed(), "{check}");
        }
        assert!(ctx.notifier.alerts().is_empty());
        // Failure checks do not count as moves.
        assert_eq!(ctx.session.state().game().unwrap().opponent_points, 0);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Session::new(Client::new("http://127.0.0.1:1").unwrap(), notifier.clone());

        let outcome = session.new_game().await;
        assert!(matches!(outcome, Outcome::Failed(Failure::Transport { .. })));
        assert!(session.state().game().is_none());
        assert!(notifier.alerts().is_empty());
    }
}
