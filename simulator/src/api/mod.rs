use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Simulator;

mod http;

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        // Browser clients may be served from any origin.
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/api/about", get(http::about))
            .route("/api/games", get(http::list_games).post(http::create_game))
            .route("/api/games/:game_number", get(http::get_game))
            .route("/api/games/:game_number/board", get(http::get_board))
            .route("/api/games/:game_number/cheatstate", post(http::cheat))
            .route("/api/games/:game_number/moves", post(http::submit_move))
            .route("/api/games/:game_number/opponents", get(http::get_opponents))
            .route("/api/games/:game_number/scoreboard", get(http::get_scoreboard))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }
}
