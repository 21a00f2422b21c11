use thiserror::Error;
use uuid::Uuid;

/// Why a game operation was refused.
///
/// Every mutating operation on [`Game`](super::Game) and [`Round`](super::Round)
/// returns one of these instead of panicking. The `Display` text is the reason
/// string handed back to players, so keep it short and readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("A round needs a subject")]
    InvalidSubject,

    #[error("'{0}' is not a valid estimation value")]
    InvalidValue(String),

    #[error("The current round has not been finished yet")]
    RoundInProgress,

    #[error("There is no open round")]
    NoOpenRound,

    #[error("The round is already finished, no more estimations are accepted")]
    RoundFinished,

    #[error("The round has already been finished")]
    AlreadyFinished,

    #[error("{0} has already estimated in this round")]
    DuplicateEstimate(String),

    #[error("Game {0} not found")]
    GameNotFound(Uuid),
}
