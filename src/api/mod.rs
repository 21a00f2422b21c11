mod auth;
mod config;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::gateway::GameService;

pub use auth::Player;
pub use config::ServerConfig;

/// Game service shared by all request handlers.
pub type SharedGames = Arc<GameService<Database>>;

pub fn create_router(db: Database, config: &ServerConfig) -> Router {
    let games: SharedGames = Arc::new(GameService::new(db, config.lock_scope));
    tracing::info!("Mutation lock scope: {}", games.lock_scope());

    let api = Router::new()
        // Games
        .route("/games", post(handlers::create_game))
        .route("/games/ids", get(handlers::list_game_ids))
        .route("/games/{id}", get(handlers::get_game))
        // Rounds
        .route(
            "/games/{id}/round",
            post(handlers::new_round).put(handlers::finish_round),
        )
        // Estimations
        .route("/games/{id}/estimation", post(handlers::estimate))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(config.cors_layer())
        .with_state(games)
}
