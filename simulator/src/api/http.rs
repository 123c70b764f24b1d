use axum::{
    body::Bytes,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use waterfight_types::{GameNumber, Location};

use crate::{Simulator, SimulatorError};

impl IntoResponse for SimulatorError {
    fn into_response(self) -> Response {
        let status = match self {
            SimulatorError::GameNotFound(_) => StatusCode::NOT_FOUND,
            SimulatorError::UnknownCheat(_) | SimulatorError::Game(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Game numbers arrive signed; a negative number names no game.
fn game_number(raw: i64) -> Result<GameNumber, Response> {
    GameNumber::try_from(raw).map_err(|_| {
        (StatusCode::NOT_FOUND, format!("no game with number {raw}")).into_response()
    })
}

pub(super) async fn about(AxumState(simulator): AxumState<Arc<Simulator>>) -> Response {
    (StatusCode::OK, simulator.about().to_string()).into_response()
}

pub(super) async fn list_games(AxumState(simulator): AxumState<Arc<Simulator>>) -> Response {
    Json(simulator.games().await).into_response()
}

pub(super) async fn create_game(AxumState(simulator): AxumState<Arc<Simulator>>) -> Response {
    match simulator.create_game().await {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to create game");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

pub(super) async fn get_game(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    match simulator.game(game_number).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn get_board(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    match simulator.board(game_number).await {
        Ok(board) => Json(board).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn get_opponents(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    match simulator.opponents(game_number).await {
        Ok(opponents) => Json(opponents).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn get_scoreboard(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    match simulator.scoreboard(game_number).await {
        Ok(scoreboard) => Json(scoreboard).into_response(),
        Err(err) => err.into_response(),
    }
}

/// The cheat keyword arrives as a raw body, optionally JSON-quoted.
pub(super) async fn cheat(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
    body: String,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    match simulator.cheat(game_number, &body).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Lookup happens before the body is parsed so an unknown game is always a 404.
pub(super) async fn submit_move(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(raw): Path<i64>,
    body: Bytes,
) -> Response {
    let game_number = match game_number(raw) {
        Ok(game_number) => game_number,
        Err(response) => return response,
    };
    if let Err(err) = simulator.game(game_number).await {
        return err.into_response();
    }
    let location: Location = match serde_json::from_slice(&body) {
        Ok(location) => location,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    match simulator.shoot(game_number, location).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => err.into_response(),
    }
}
