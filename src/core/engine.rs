use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::core::game::Game;
use crate::core::score::UserId;
use crate::core::words::WordDictionary;
use crate::error::EngineError;

/// Creates games from an injected, immutable word dictionary.
#[derive(Debug, Clone)]
pub struct GameEngine {
    words: Arc<WordDictionary>,
}

impl GameEngine {
    pub fn new(words: WordDictionary) -> Self {
        Self { words: Arc::new(words) }
    }

    pub fn words(&self) -> &WordDictionary {
        &self.words
    }

    pub fn new_game(&self, owner: UserId, min_length: usize, max_length: usize) -> Result<Game, EngineError> {
        self.new_game_with_rng(owner, min_length, max_length, &mut rand::rng())
    }

    pub fn new_game_with_rng<R: Rng + ?Sized>(
        &self,
        owner: UserId,
        min_length: usize,
        max_length: usize,
        rng: &mut R,
    ) -> Result<Game, EngineError> {
        if max_length < min_length {
            return Err(EngineError::InvalidRange { min: min_length, max: max_length });
        }

        let target = self.words.choose(min_length, max_length, rng)?;
        let game = Game::new(owner, &target);
        debug!(game = %game.id(), owner = %owner, len = target.chars().count(), "created game");
        Ok(game)
    }
}
