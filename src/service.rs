//! Hangman service: users, games, scores and rankings on top of a `GameStore`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::core::engine::GameEngine;
use crate::core::game::{CancelOutcome, Game, GameId};
use crate::core::protocol::{CancelView, GameHistory, GameView, ScoreView};
use crate::core::score::{sort_high_scores, sort_rankings, Score, User, UserId, UserRanking};
use crate::error::{ServiceError, StoreError};
use crate::store::GameStore;

/// Reminder for a user who has an unfinished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub user_name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

pub struct HangmanService {
    engine: GameEngine,
    store: Arc<dyn GameStore>,
    default_min_length: usize,
    default_max_length: usize,
    average_attempts: RwLock<Option<String>>,
    game_locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl HangmanService {
    pub fn new(engine: GameEngine, store: Arc<dyn GameStore>) -> Self {
        let defaults = ServerConfig::default();
        Self {
            engine,
            store,
            default_min_length: defaults.default_min_length,
            default_max_length: defaults.default_max_length,
            average_attempts: RwLock::new(None),
            game_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Length bounds applied when a new-game request leaves them out.
    pub fn with_default_lengths(mut self, min: usize, max: usize) -> Self {
        self.default_min_length = min;
        self.default_max_length = max;
        self
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub async fn create_user(&self, user_name: &str, email: Option<String>) -> Result<String, ServiceError> {
        match self.store.insert_user(User::new(user_name, email)).await {
            Ok(()) => {
                info!(user = user_name, "user created");
                Ok(format!("User {user_name} created!"))
            }
            Err(StoreError::Conflict(_)) => Err(ServiceError::UserExists(user_name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn new_game(
        &self,
        user_name: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<GameView, ServiceError> {
        let user = self.user_by_name(user_name).await?;
        let min = min.unwrap_or(self.default_min_length);
        let max = max.unwrap_or(self.default_max_length);

        let game = self.engine.new_game(user.id, min, max)?;
        self.store.save_game(game.clone()).await?;
        info!(game = %game.id(), user = user_name, min, max, "new game");

        self.refresh_average_attempts().await?;
        Ok(GameView::new(&game, user.name, "Good luck playing Hangman!"))
    }

    pub async fn get_game(&self, game_id: GameId) -> Result<GameView, ServiceError> {
        let game = self.load_game(game_id).await?;
        let message = if game.is_over() { "Game Over!" } else { "Time to make a move!" };
        self.view(&game, message).await
    }

    /// Apply one guess. Moves on the same game are serialized.
    pub async fn make_move(&self, game_id: GameId, guess: &str) -> Result<GameView, ServiceError> {
        let (_guard, mut game) = self.lock_game(game_id).await?;
        let outcome = game.apply_guess(guess);
        debug!(game = %game_id, guess, outcome = %outcome, "guess evaluated");

        if outcome.changes_state() {
            self.store.save_game(game.clone()).await?;
        }
        if let Some(score) = outcome.score() {
            self.finish_game(&game, score.clone()).await?;
        }

        self.view(&game, outcome.to_string()).await
    }

    pub async fn cancel_game(&self, game_id: GameId) -> Result<CancelView, ServiceError> {
        let (_guard, mut game) = self.lock_game(game_id).await?;
        let outcome = game.cancel();
        if outcome == CancelOutcome::Cancelled {
            self.store.delete_game(game_id).await?;
            self.game_locks.lock().await.remove(&game_id);
            info!(game = %game_id, "game cancelled");
        }

        Ok(CancelView {
            game_id,
            cancelled: outcome == CancelOutcome::Cancelled,
            message: outcome.to_string(),
        })
    }

    /// Unfinished games owned by the user.
    pub async fn user_games(&self, user_name: &str) -> Result<Vec<GameView>, ServiceError> {
        let user = self.user_by_name(user_name).await?;
        let games = self.store.games_for_user(user.id).await?;
        Ok(games
            .iter()
            .filter(|g| !g.is_over())
            .map(|g| GameView::new(g, user.name.clone(), "Game in Progress"))
            .collect())
    }

    pub async fn game_history(&self, game_id: GameId) -> Result<GameHistory, ServiceError> {
        let game = self.load_game(game_id).await?;
        Ok(GameHistory::from(&game))
    }

    pub async fn scores(&self) -> Result<Vec<ScoreView>, ServiceError> {
        let scores = self.store.scores().await?;
        self.score_views(scores).await
    }

    pub async fn user_scores(&self, user_name: &str) -> Result<Vec<ScoreView>, ServiceError> {
        let user = self.user_by_name(user_name).await?;
        let scores = self.store.scores_for_user(user.id).await?;
        self.score_views(scores).await
    }

    pub async fn high_scores(&self, limit: Option<usize>) -> Result<Vec<ScoreView>, ServiceError> {
        let mut scores = self.store.scores().await?;
        sort_high_scores(&mut scores);
        if let Some(limit) = limit {
            scores.truncate(limit);
        }
        self.score_views(scores).await
    }

    pub async fn user_rankings(&self) -> Result<Vec<UserRanking>, ServiceError> {
        let mut rankings: Vec<_> = self.store.users().await?.iter().map(User::ranking).collect();
        sort_rankings(&mut rankings);
        Ok(rankings)
    }

    /// Last cached average, or an empty string if it was never computed.
    pub async fn average_attempts(&self) -> String {
        self.average_attempts.read().await.clone().unwrap_or_default()
    }

    /// Recompute the average attempts remaining over unfinished games. The
    /// cache is left as is when there are none.
    pub async fn refresh_average_attempts(&self) -> Result<Option<f64>, ServiceError> {
        let games = self.store.active_games().await?;
        if games.is_empty() {
            return Ok(None);
        }

        let total: u32 = games.iter().map(Game::attempts_remaining).sum();
        let average = f64::from(total) / games.len() as f64;
        *self.average_attempts.write().await = Some(format!("The average moves remaining is {average:.2}"));
        debug!(games = games.len(), average, "average attempts refreshed");
        Ok(Some(average))
    }

    /// One reminder per user with an email address and an unfinished game.
    pub async fn pending_reminders(&self) -> Result<Vec<Reminder>, ServiceError> {
        let mut seen = HashSet::new();
        let mut reminders = Vec::new();

        for game in self.store.active_games().await? {
            if !seen.insert(game.owner()) {
                continue;
            }
            let Some(user) = self.store.user_by_id(game.owner()).await? else {
                continue;
            };
            if let Some(email) = user.email.filter(|e| !e.is_empty()) {
                reminders.push(Reminder {
                    body: format!("Hello {}, come back and finish playing Hangman!", user.name),
                    subject: "This is a reminder!".to_string(),
                    user_name: user.name,
                    email,
                });
            }
        }

        Ok(reminders)
    }

    async fn finish_game(&self, game: &Game, score: Score) -> Result<(), ServiceError> {
        if let Some(mut user) = self.store.user_by_id(score.user).await? {
            user.record(&score);
            self.store.save_user(user).await?;
        }
        info!(game = %game.id(), won = score.won, score = score.game_score, "game finished");
        self.store.save_score(score).await?;
        self.game_locks.lock().await.remove(&game.id());
        Ok(())
    }

    async fn game_lock(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.game_locks.lock().await.entry(game_id).or_default().clone()
    }

    /// Take the game's lock, then load it. The lock entry is dropped again
    /// when the game does not exist, so unknown ids leave nothing behind.
    async fn lock_game(&self, game_id: GameId) -> Result<(OwnedMutexGuard<()>, Game), ServiceError> {
        let guard = self.game_lock(game_id).await.lock_owned().await;
        match self.load_game(game_id).await {
            Ok(game) => Ok((guard, game)),
            Err(e) => {
                drop(guard);
                self.game_locks.lock().await.remove(&game_id);
                Err(e)
            }
        }
    }

    async fn load_game(&self, game_id: GameId) -> Result<Game, ServiceError> {
        self.store
            .load_game(game_id)
            .await?
            .ok_or(ServiceError::GameNotFound(game_id))
    }

    async fn user_by_name(&self, user_name: &str) -> Result<User, ServiceError> {
        self.store
            .user_by_name(user_name)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_name.to_string()))
    }

    async fn user_name(&self, id: UserId) -> Result<String, ServiceError> {
        Ok(self.store.user_by_id(id).await?.map(|u| u.name).unwrap_or_default())
    }

    async fn view(&self, game: &Game, message: impl Into<String>) -> Result<GameView, ServiceError> {
        let user_name = self.user_name(game.owner()).await?;
        Ok(GameView::new(game, user_name, message))
    }

    async fn score_views(&self, scores: Vec<Score>) -> Result<Vec<ScoreView>, ServiceError> {
        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut views = Vec::with_capacity(scores.len());
        for score in scores {
            if !names.contains_key(&score.user) {
                let name = self.user_name(score.user).await?;
                names.insert(score.user, name);
            }
            views.push(ScoreView {
                user_name: names.get(&score.user).cloned().unwrap_or_default(),
                date: score.date.format("%Y-%m-%d").to_string(),
                won: score.won,
                game_score: score.game_score,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::GameStatus;
    use crate::core::words::WordDictionary;
    use crate::error::EngineError;
    use crate::store::MemStore;

    fn service(words: &[&str]) -> HangmanService {
        let engine = GameEngine::new(WordDictionary::new(words.iter().copied()));
        HangmanService::new(engine, Arc::new(MemStore::new()))
    }

    async fn play(service: &HangmanService, id: GameId, guesses: &str) -> GameView {
        let mut last = None;
        for c in guesses.chars() {
            last = Some(service.make_move(id, &c.to_string()).await.unwrap());
        }
        last.expect("at least one guess")
    }

    #[tokio::test]
    async fn test_create_user_twice() {
        let svc = service(&["cat"]);
        assert_eq!(svc.create_user("ada", None).await.unwrap(), "User ada created!");
        let err = svc.create_user("ada", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserExists(name) if name == "ada"));
    }

    #[tokio::test]
    async fn test_new_game_unknown_user() {
        let svc = service(&["cat"]);
        let err = svc.new_game("nobody", None, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_new_game_errors_surface() {
        let svc = service(&["cat"]);
        svc.create_user("ada", None).await.unwrap();

        let err = svc.new_game("ada", Some(4), Some(2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(EngineError::InvalidRange { min: 4, max: 2 })));

        let err = svc.new_game("ada", Some(5), Some(8)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(EngineError::NoWordsAvailable { .. })));
    }

    #[tokio::test]
    async fn test_win_records_score_and_ranking() {
        let svc = service(&["cat"]);
        svc.create_user("ada", None).await.unwrap();
        let view = svc.new_game("ada", None, None).await.unwrap();
        assert_eq!(view.message, "Good luck playing Hangman!");
        assert_eq!(view.revealed, "$$$");

        let view = play(&svc, view.game_id, "cat").await;
        assert_eq!(view.message, "You win!");
        assert!(view.game_over);
        assert_eq!(view.answer.as_deref(), Some("cat"));

        let scores = svc.user_scores("ada").await.unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores[0].won);
        assert_eq!(scores[0].game_score, 24);
        assert_eq!(scores[0].user_name, "ada");

        let rankings = svc.user_rankings().await.unwrap();
        assert_eq!(rankings[0].total_games_played, 1);
        assert_eq!(rankings[0].total_game_score, 24);

        let view = svc.make_move(view.game_id, "x").await.unwrap();
        assert_eq!(view.message, "Game already over!");
        assert_eq!(svc.scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_loss_records_zero_score() {
        let svc = service(&["dog"]);
        svc.create_user("bob", None).await.unwrap();
        let id = svc.new_game("bob", None, None).await.unwrap().game_id;

        let view = play(&svc, id, "abcefhij").await;
        assert_eq!(view.message, "Game over!");
        assert_eq!(view.attempts_remaining, 0);
        assert_eq!(view.status, GameStatus::Lost);

        let scores = svc.scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert!(!scores[0].won);
        assert_eq!(scores[0].game_score, 0);
    }

    #[tokio::test]
    async fn test_get_game_messages() {
        let svc = service(&["ox"]);
        svc.create_user("ada", None).await.unwrap();
        let id = svc.new_game("ada", None, None).await.unwrap().game_id;

        assert_eq!(svc.get_game(id).await.unwrap().message, "Time to make a move!");
        play(&svc, id, "ox").await;
        assert_eq!(svc.get_game(id).await.unwrap().message, "Game Over!");

        let err = svc.get_game(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::GameNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_deletes_only_in_progress() {
        let svc = service(&["ox"]);
        svc.create_user("ada", None).await.unwrap();

        let id = svc.new_game("ada", None, None).await.unwrap().game_id;
        let cancel = svc.cancel_game(id).await.unwrap();
        assert_eq!(cancel.message, "Game cancelled!");
        assert!(cancel.cancelled);
        assert!(svc.store().load_game(id).await.unwrap().is_none());
        assert!(svc.scores().await.unwrap().is_empty());

        let id = svc.new_game("ada", None, None).await.unwrap().game_id;
        play(&svc, id, "ox").await;
        let cancel = svc.cancel_game(id).await.unwrap();
        assert_eq!(cancel.message, "Game is already over. Cannot cancel.");
        assert!(!cancel.cancelled);
        assert!(svc.store().load_game(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_guesses_do_not_touch_store() {
        let svc = service(&["cat"]);
        svc.create_user("ada", None).await.unwrap();
        let id = svc.new_game("ada", None, None).await.unwrap().game_id;
        let before = svc.store().load_game(id).await.unwrap();

        assert_eq!(svc.make_move(id, "ab").await.unwrap().message, "Valid guesses are one letter only!");
        assert_eq!(svc.make_move(id, "5").await.unwrap().message, "Letters only!");
        assert_eq!(svc.store().load_game(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_user_games_lists_active_only() {
        let svc = service(&["ox"]);
        svc.create_user("ada", None).await.unwrap();
        let done = svc.new_game("ada", None, None).await.unwrap().game_id;
        let open = svc.new_game("ada", None, None).await.unwrap().game_id;
        play(&svc, done, "ox").await;

        let games = svc.user_games("ada").await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, open);
        assert_eq!(games[0].message, "Game in Progress");
    }

    #[tokio::test]
    async fn test_high_scores_sorted_and_limited() {
        let svc = service(&["ox"]);
        svc.create_user("ada", None).await.unwrap();

        // 8*2, 7*2, 0
        for guesses in ["ox", "zox", "abcdefgh"] {
            let id = svc.new_game("ada", None, None).await.unwrap().game_id;
            play(&svc, id, guesses).await;
        }

        let top: Vec<_> = svc.high_scores(Some(2)).await.unwrap().iter().map(|s| s.game_score).collect();
        assert_eq!(top, [16, 14]);
        assert_eq!(svc.high_scores(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_average_attempts_cache() {
        let svc = service(&["cat"]);
        assert_eq!(svc.average_attempts().await, "");

        svc.create_user("ada", None).await.unwrap();
        let a = svc.new_game("ada", None, None).await.unwrap().game_id;
        svc.new_game("ada", None, None).await.unwrap();
        assert_eq!(svc.average_attempts().await, "The average moves remaining is 8.00");

        svc.make_move(a, "z").await.unwrap();
        assert_eq!(svc.refresh_average_attempts().await.unwrap(), Some(7.5));
        assert_eq!(svc.average_attempts().await, "The average moves remaining is 7.50");
    }

    #[tokio::test]
    async fn test_pending_reminders() {
        let svc = service(&["cat"]);
        svc.create_user("ada", Some("ada@example.com".into())).await.unwrap();
        svc.create_user("bob", None).await.unwrap();
        svc.create_user("cy", Some("cy@example.com".into())).await.unwrap();

        svc.new_game("ada", None, None).await.unwrap();
        svc.new_game("ada", None, None).await.unwrap();
        svc.new_game("bob", None, None).await.unwrap();

        let reminders = svc.pending_reminders().await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].email, "ada@example.com");
        assert_eq!(reminders[0].body, "Hello ada, come back and finish playing Hangman!");
    }

    #[tokio::test]
    async fn test_concurrent_moves_are_serialized() {
        let svc = Arc::new(service(&["abcdefghijkl"]));
        svc.create_user("ada", None).await.unwrap();
        let id = svc.new_game("ada", Some(12), Some(12)).await.unwrap().game_id;

        let mut handles = Vec::new();
        for c in "abcdefghijkl".chars() {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move { svc.make_move(id, &c.to_string()).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = svc.game_history(id).await.unwrap();
        assert_eq!(history.guesses.len(), 12);
        assert!(history.game_over);
        assert_eq!(svc.scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_game_ids_leave_no_locks() {
        let svc = service(&["cat"]);
        for _ in 0..100 {
            let err = svc.make_move(GameId::new_v4(), "a").await.unwrap_err();
            assert!(matches!(err, ServiceError::GameNotFound(_)));
            let err = svc.cancel_game(GameId::new_v4()).await.unwrap_err();
            assert!(matches!(err, ServiceError::GameNotFound(_)));
        }
        assert!(svc.game_locks.lock().await.is_empty());

        svc.create_user("ada", None).await.unwrap();
        let id = svc.new_game("ada", None, None).await.unwrap().game_id;
        svc.cancel_game(id).await.unwrap();
        assert!(svc.make_move(id, "c").await.is_err());
        assert!(svc.cancel_game(id).await.is_err());
        assert!(svc.game_locks.lock().await.is_empty());
    }
}
