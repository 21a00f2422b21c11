use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::auth::Player;
use super::SharedGames;
use crate::db::Database;
use crate::gateway::{GameService, MutationError};
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side, clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Map a failed mutation to a response.
///
/// Refusals carry their reason string so players can see why their action
/// did not count. A missing game is a 404, every other refusal a 403.
fn mutation_error(e: MutationError) -> (StatusCode, String) {
    match e {
        MutationError::Rejected(reason) => {
            let status = match &reason {
                GameError::GameNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::FORBIDDEN,
            };
            (status, reason.to_string())
        }
        MutationError::Repository(e) => internal_error(e),
    }
}

/// Run a service call on the blocking pool.
///
/// Every call ends in synchronous SQLite work, and mutations also wait on the
/// mutation lock, so none of it runs on the async workers.
async fn blocking<T, F>(games: &SharedGames, f: F) -> Result<T, (StatusCode, String)>
where
    F: FnOnce(&GameService<Database>) -> T + Send + 'static,
    T: Send + 'static,
{
    let games = games.clone();
    tokio::task::spawn_blocking(move || f(&games))
        .await
        .map_err(internal_error)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Games
// ============================================================

pub async fn create_game(
    State(games): State<SharedGames>,
    player: Player,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let game = blocking(&games, move |games| games.create_game(player.name()))
        .await?
        .map_err(internal_error)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/games/{}", game.id))],
        Json(CreatedGame { id: game.id }),
    ))
}

pub async fn get_game(
    State(games): State<SharedGames>,
    Path(id): Path<Uuid>,
) -> Result<Json<Game>, (StatusCode, String)> {
    blocking(&games, move |games| games.get_game(id))
        .await?
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Game not found".to_string()))
}

pub async fn list_game_ids(
    State(games): State<SharedGames>,
) -> Result<Json<Vec<Uuid>>, (StatusCode, String)> {
    blocking(&games, |games| games.game_ids())
        .await?
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Rounds
// ============================================================

pub async fn new_round(
    State(games): State<SharedGames>,
    Path(id): Path<Uuid>,
    player: Player,
    Json(input): Json<NewRoundInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    blocking(&games, move |games| {
        games.new_round(id, &input.subject, player.name())
    })
    .await?
    .map(|_| StatusCode::OK)
    .map_err(mutation_error)
}

pub async fn finish_round(
    State(games): State<SharedGames>,
    Path(id): Path<Uuid>,
    player: Player,
    Json(input): Json<FinishRoundInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    blocking(&games, move |games| {
        games.finish_round(id, &input.consensus, player.name())
    })
    .await?
    .map(|_| StatusCode::OK)
    .map_err(mutation_error)
}

// ============================================================
// Estimations
// ============================================================

pub async fn estimate(
    State(games): State<SharedGames>,
    Path(id): Path<Uuid>,
    player: Player,
    Json(input): Json<EstimationInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    blocking(&games, move |games| {
        games.estimate(id, &input.value, player.name())
    })
    .await?
    .map(|_| StatusCode::OK)
    .map_err(mutation_error)
}
