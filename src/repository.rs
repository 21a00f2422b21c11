//! Storage contract for games.

use anyhow::Result;
use uuid::Uuid;

use crate::models::Game;

/// Where games live between requests.
///
/// Implementations must make `get` and `update` atomic for a single id: a
/// reader never sees half of an update. Serializing whole load-mutate-store
/// cycles is the job of [`GameService`](crate::gateway::GameService), not the
/// repository.
pub trait GameRepository: Send + Sync {
    fn add(&self, game: &Game) -> Result<()>;

    /// `Ok(None)` when no game has this id.
    fn get(&self, id: Uuid) -> Result<Option<Game>>;

    /// Replace the stored state of an existing game.
    fn update(&self, game: &Game) -> Result<()>;

    /// Ids of all stored games, oldest first.
    fn ids(&self) -> Result<Vec<Uuid>>;
}
