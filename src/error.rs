//! Error types for the hangman engine, store and service.
//!
//! Gameplay conditions (repeat guesses, bad input, finished games) are not
//! errors; they come back as `GuessOutcome` values. Only structurally invalid
//! requests end up here.

use crate::core::game::GameId;

/// Failures while creating a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// `max` was smaller than `min`.
    #[error("Maximum must be greater than minimum! (min {min}, max {max})")]
    InvalidRange { min: usize, max: usize },

    /// No dictionary word has a length inside `[min, max]`.
    #[error("No words available with length between {min} and {max}")]
    NoWordsAvailable { min: usize, max: usize },
}

/// Failures reported by a `GameStore` backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend-specific failure (connection, serialization, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Top-level error type for service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("A User with that name already exists!")]
    UserExists(String),

    #[error("A User with that name does not exist!")]
    UserNotFound(String),

    #[error("Game not found! ({0})")]
    GameNotFound(GameId),
}
