//! Persistence collaborator for users, games and scores.
//!
//! The engine never touches storage. The service loads a `Game`, runs a
//! transition on it and hands the replacement value back to a `GameStore`.
//! Stores are not expected to detect concurrent writes; the service
//! serializes moves per game before calling in.

pub mod memory;

pub use memory::MemStore;

use async_trait::async_trait;

use crate::core::game::{Game, GameId};
use crate::core::score::{Score, User, UserId};
use crate::error::StoreError;

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a new user. Fails with `StoreError::Conflict` if the name is taken.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;

    /// Overwrite an existing user record.
    async fn save_user(&self, user: User) -> Result<(), StoreError>;

    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn users(&self) -> Result<Vec<User>, StoreError>;

    async fn load_game(&self, id: GameId) -> Result<Option<Game>, StoreError>;

    async fn save_game(&self, game: Game) -> Result<(), StoreError>;

    async fn delete_game(&self, id: GameId) -> Result<(), StoreError>;

    async fn games_for_user(&self, user: UserId) -> Result<Vec<Game>, StoreError>;

    /// Every game that has not finished.
    async fn active_games(&self) -> Result<Vec<Game>, StoreError>;

    async fn save_score(&self, score: Score) -> Result<(), StoreError>;

    async fn scores(&self) -> Result<Vec<Score>, StoreError>;

    async fn scores_for_user(&self, user: UserId) -> Result<Vec<Score>, StoreError>;
}
