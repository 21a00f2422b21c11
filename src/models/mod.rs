//! Domain models for Estimo.
//!
//! # Core Concepts
//!
//! - [`Game`]: A planning poker session owned by one player, holding its rounds
//!   in the order they were played.
//! - [`Round`]: One item being estimated. Open until a consensus is recorded,
//!   finished forever after.
//! - [`Estimation`]: A single player's card in a round, one per player.
//! - [`EstimationValue`]: The fixed deck of cards (`0`, `1/2`, `1`, … `100`, `∞`, `?`).
//!
//! Mutations return [`GameError`] on refusal and leave the model unchanged.

mod error;
mod estimation;
mod game;
mod round;

pub use error::*;
pub use estimation::*;
pub use game::*;
pub use round::*;
