use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GameError;
use super::estimation::{Estimation, EstimationValue};
use super::round::Round;

/// An estimation session owned by one player.
///
/// Rounds are kept in the order they were started. Only the last round can be
/// open, and only an open round accepts estimations or a consensus. A failed
/// operation leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    /// Player who created the game.
    pub owner: String,
    pub rounds: Vec<Round>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            rounds: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// The last round, if it is still open.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| !r.is_finished())
    }

    fn current_round_mut(&mut self) -> Result<&mut Round, GameError> {
        self.rounds
            .last_mut()
            .filter(|r| !r.is_finished())
            .ok_or(GameError::NoOpenRound)
    }

    /// Start a new round. Any player may do this, not only the owner.
    pub fn new_round(&mut self, subject: &str, _player: &str) -> Result<(), GameError> {
        if self.current_round().is_some() {
            return Err(GameError::RoundInProgress);
        }

        let round = Round::new(subject)?;
        self.rounds.push(round);
        Ok(())
    }

    /// Record the consensus on the open round. Any player may do this.
    pub fn finish_current_round(
        &mut self,
        consensus: EstimationValue,
        _player: &str,
    ) -> Result<(), GameError> {
        self.current_round_mut()?.finish(consensus)
    }

    /// Add an estimation to the latest round.
    ///
    /// Fails with [`GameError::NoOpenRound`] only when no round was ever
    /// started; a finished latest round rejects with [`GameError::RoundFinished`].
    pub fn estimate(&mut self, estimation: Estimation) -> Result<(), GameError> {
        self.rounds
            .last_mut()
            .ok_or(GameError::NoOpenRound)?
            .estimate(estimation)
    }
}

/// Input for starting a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoundInput {
    pub subject: String,
}

/// Input for finishing the open round. `consensus` is a card token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishRoundInput {
    pub consensus: String,
}

/// Input for submitting an estimation. `value` is a card token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationInput {
    pub value: String,
}

/// Response to creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedGame {
    pub id: Uuid,
}
