pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod jobs;
pub mod service;
pub mod store;

// Re-export for convenience
pub use crate::core::engine::GameEngine;
pub use crate::core::game::{Game, GameId, GameStatus, GuessOutcome};
pub use crate::core::websocket::HangmanServer;
pub use crate::core::words::WordDictionary;
pub use crate::service::HangmanService;
pub use crate::store::{GameStore, MemStore};
