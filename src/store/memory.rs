//! In-memory game store.
//!
//! `MemStore` keeps every record in `BTreeMap`s behind tokio `RwLock`s so
//! listings come back in a stable order. Good enough for a single server
//! process and for tests; nothing is written to disk.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::game::{Game, GameId};
use crate::core::score::{Score, User, UserId};
use crate::error::StoreError;
use crate::store::GameStore;

#[derive(Debug, Default)]
pub struct MemStore {
    users: RwLock<BTreeMap<UserId, User>>,
    games: RwLock<BTreeMap<GameId, Game>>,
    scores: RwLock<Vec<Score>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }
}

#[async_trait]
impl GameStore for MemStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.name == user.name) {
            return Err(StoreError::Conflict(format!("user '{}' already exists", user.name)));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn save_user(&self, user: User) -> Result<(), StoreError> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }

    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.values().find(|u| u.name == name).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn load_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn save_game(&self, game: Game) -> Result<(), StoreError> {
        self.games.write().await.insert(game.id(), game);
        Ok(())
    }

    async fn delete_game(&self, id: GameId) -> Result<(), StoreError> {
        self.games.write().await.remove(&id);
        Ok(())
    }

    async fn games_for_user(&self, user: UserId) -> Result<Vec<Game>, StoreError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.owner() == user)
            .cloned()
            .collect())
    }

    async fn active_games(&self) -> Result<Vec<Game>, StoreError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| !g.is_over())
            .cloned()
            .collect())
    }

    async fn save_score(&self, score: Score) -> Result<(), StoreError> {
        self.scores.write().await.push(score);
        Ok(())
    }

    async fn scores(&self) -> Result<Vec<Score>, StoreError> {
        Ok(self.scores.read().await.clone())
    }

    async fn scores_for_user(&self, user: UserId) -> Result<Vec<Score>, StoreError> {
        Ok(self
            .scores
            .read()
            .await
            .iter()
            .filter(|s| s.user == user)
            .cloned()
            .collect())
    }
}
