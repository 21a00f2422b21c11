use serde::{Deserialize, Serialize};

use super::error::GameError;
use super::estimation::{Estimation, EstimationValue};

/// One estimation exercise within a game.
///
/// A round is **open** until someone records the consensus, after which it is
/// finished for good. While open it collects at most one [`Estimation`] per
/// player, kept in submission order.
///
/// # Lifecycle
/// Open → Finished. The transition happens only through [`Round::finish`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// What is being estimated.
    pub subject: String,
    pub estimations: Vec<Estimation>,
    /// Agreed value, set once the round is finished.
    pub consensus: Option<EstimationValue>,
}

impl Round {
    pub fn new(subject: &str) -> Result<Self, GameError> {
        if subject.trim().is_empty() {
            return Err(GameError::InvalidSubject);
        }

        Ok(Self {
            subject: subject.to_string(),
            estimations: Vec::new(),
            consensus: None,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.consensus.is_some()
    }

    pub fn estimate(&mut self, estimation: Estimation) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::RoundFinished);
        }
        if self.estimation_of(&estimation.player).is_some() {
            return Err(GameError::DuplicateEstimate(estimation.player));
        }

        self.estimations.push(estimation);
        Ok(())
    }

    /// Record the consensus and close the round.
    ///
    /// The consensus is whatever the players agreed on; it does not have to
    /// match any submitted estimation, and the round may even be empty.
    pub fn finish(&mut self, consensus: EstimationValue) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::AlreadyFinished);
        }

        self.consensus = Some(consensus);
        Ok(())
    }

    pub fn estimation_of(&self, player: &str) -> Option<&Estimation> {
        self.estimations.iter().find(|e| e.player == player)
    }

    /// Players who voted at either extreme of a finished round.
    ///
    /// These are the ones asked to explain their card. Empty while the round is
    /// open, or when every estimation agrees.
    pub fn outstanding_players(&self) -> Vec<&str> {
        if !self.is_finished() {
            return Vec::new();
        }

        let (Some(min), Some(max)) = (
            self.estimations.iter().map(|e| e.value).min(),
            self.estimations.iter().map(|e| e.value).max(),
        ) else {
            return Vec::new();
        };

        if min == max {
            return Vec::new();
        }

        self.estimations
            .iter()
            .filter(|e| e.value == min || e.value == max)
            .map(|e| e.player.as_str())
            .collect()
    }
}
