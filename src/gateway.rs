//! Serialized load-mutate-store cycles over a [`GameRepository`].
//!
//! Requests arrive concurrently, but every mutation of a game is a read of the
//! whole game, a change in memory and a write of the whole game back. Two such
//! cycles interleaving would lose one of the changes, so each cycle runs inside
//! a [`MutationLock`]. Reads go straight to the repository.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use uuid::Uuid;

use crate::models::*;
use crate::repository::GameRepository;

/// How widely a mutation excludes other mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockScope {
    /// One lock for the whole process. Mutations on unrelated games wait for
    /// each other.
    #[default]
    Global,
    /// One lock per game id, created on first use. Mutations on different
    /// games run in parallel.
    PerGame,
}

impl LockScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerGame => "per-game",
        }
    }
}

impl FromStr for LockScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "per-game" => Ok(Self::PerGame),
            other => Err(format!(
                "unknown lock scope '{}', expected 'global' or 'per-game'",
                other
            )),
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The critical section around a load-mutate-store cycle.
///
/// The mutexes guard `()`, so a panic inside a cycle leaves nothing
/// half-written behind the lock and a poisoned lock is simply reused.
#[derive(Debug, Default)]
pub struct MutationLock {
    scope: LockScope,
    global: Mutex<()>,
    games: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MutationLock {
    pub fn new(scope: LockScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> LockScope {
        self.scope
    }

    /// Run `f` while holding the lock that covers `game_id`.
    pub fn with<T>(&self, game_id: Uuid, f: impl FnOnce() -> T) -> T {
        match self.scope {
            LockScope::Global => {
                let _guard = self.global.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
            LockScope::PerGame => {
                let lock = self.game_lock(game_id);
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
        }
    }

    // Entries are never removed; games are never deleted here either.
    fn game_lock(&self, game_id: Uuid) -> Arc<Mutex<()>> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        games.entry(game_id).or_default().clone()
    }
}

/// Why a mutation did not happen.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The game refused the change, or does not exist. Nothing was stored.
    #[error("{0}")]
    Rejected(#[from] GameError),

    /// Storage failed underneath us.
    #[error("repository failure: {0:#}")]
    Repository(anyhow::Error),
}

impl From<anyhow::Error> for MutationError {
    fn from(e: anyhow::Error) -> Self {
        Self::Repository(e)
    }
}

/// Entry point for every game operation.
pub struct GameService<R> {
    repo: R,
    lock: MutationLock,
}

impl<R: GameRepository> GameService<R> {
    pub fn new(repo: R, scope: LockScope) -> Self {
        Self {
            repo,
            lock: MutationLock::new(scope),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn lock_scope(&self) -> LockScope {
        self.lock.scope()
    }

    /// Create a game owned by `owner`. A fresh id cannot collide with a running
    /// mutation, so no lock is taken.
    pub fn create_game(&self, owner: &str) -> anyhow::Result<Game> {
        let game = Game::new(owner);
        self.repo.add(&game)?;
        tracing::info!(game_id = %game.id, owner, "Game created");
        Ok(game)
    }

    pub fn new_round(&self, id: Uuid, subject: &str, player: &str) -> Result<(), MutationError> {
        self.mutate(id, |game| game.new_round(subject, player))?;
        tracing::info!(game_id = %id, player, subject, "Round started");
        Ok(())
    }

    /// Finish the open round with `consensus`, a card token such as `"8"`.
    pub fn finish_round(
        &self,
        id: Uuid,
        consensus: &str,
        player: &str,
    ) -> Result<(), MutationError> {
        let consensus: EstimationValue = consensus.parse()?;
        self.mutate(id, |game| game.finish_current_round(consensus, player))?;
        tracing::info!(game_id = %id, player, %consensus, "Round finished");
        Ok(())
    }

    /// Submit `player`'s card, given as a token such as `"1/2"` or `"?"`.
    pub fn estimate(&self, id: Uuid, value: &str, player: &str) -> Result<(), MutationError> {
        let estimation = Estimation::new(value, player)?;
        self.mutate(id, |game| game.estimate(estimation))?;
        tracing::debug!(game_id = %id, player, "Estimation accepted");
        Ok(())
    }

    /// Never takes the mutation lock; a running mutation is not waited for.
    pub fn get_game(&self, id: Uuid) -> anyhow::Result<Option<Game>> {
        self.repo.get(id)
    }

    pub fn game_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        self.repo.ids()
    }

    /// Load, apply `op`, store. The store only happens when `op` succeeds.
    fn mutate<F>(&self, id: Uuid, op: F) -> Result<(), MutationError>
    where
        F: FnOnce(&mut Game) -> Result<(), GameError>,
    {
        let result = self.lock.with(id, || -> Result<(), MutationError> {
            let mut game = self.repo.get(id)?.ok_or(GameError::GameNotFound(id))?;
            op(&mut game)?;
            self.repo.update(&game)?;
            Ok(())
        });

        match &result {
            Err(MutationError::Rejected(reason)) => {
                tracing::warn!(game_id = %id, "Mutation rejected: {}", reason);
            }
            Err(MutationError::Repository(e)) => {
                tracing::error!(game_id = %id, "Repository failure: {:#}", e);
            }
            Ok(()) => {}
        }

        result
    }
}
