/// Users, score records and the ranking/high-score orderings built from them
use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub total_game_score: u64,
    pub total_games_played: u32,
    /// Running average of `game_score` over finished games.
    pub user_score: f64,
}

impl User {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
            total_game_score: 0,
            total_games_played: 0,
            user_score: 0.0,
        }
    }

    /// Fold a finished game into the user's totals.
    pub fn record(&mut self, score: &Score) {
        self.total_game_score += u64::from(score.game_score);
        self.total_games_played += 1;
        self.user_score = self.total_game_score as f64 / f64::from(self.total_games_played);
    }

    pub fn ranking(&self) -> UserRanking {
        UserRanking {
            user_name: self.name.clone(),
            total_game_score: self.total_game_score,
            total_games_played: self.total_games_played,
            user_score: self.user_score,
        }
    }
}

/// Outcome of a finished (won or lost) game. Never created for cancelled games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub user: UserId,
    pub date: NaiveDate,
    pub won: bool,
    pub game_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRanking {
    pub user_name: String,
    pub total_game_score: u64,
    pub total_games_played: u32,
    pub user_score: f64,
}

/// Best average first; ties go to the higher total, then to the name.
pub fn sort_rankings(rankings: &mut [UserRanking]) {
    rankings.sort_by(|a, b| {
        b.user_score
            .partial_cmp(&a.user_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_game_score.cmp(&a.total_game_score))
            .then_with(|| a.user_name.cmp(&b.user_name))
    });
}

/// Highest `game_score` first; older scores win ties.
pub fn sort_high_scores(scores: &mut [Score]) {
    scores.sort_by(|a, b| b.game_score.cmp(&a.game_score).then_with(|| a.date.cmp(&b.date)));
}
