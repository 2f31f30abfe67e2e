//! WebSocket JSON protocol.
//!
//! One `ClientMessage` per text frame from the client, one `ServerMessage`
//! per text frame back. The server opens every session with
//! `ServerMessage::ServerInfo`, then answers requests strictly in order.

use serde::{Deserialize, Serialize};

use crate::core::game::{Game, GameId, GameStatus};
use crate::core::score::UserRanking;

pub const SERVER_NAME: &str = "Hangman";
pub const SERVER_DESCRIPTION: &str = "Guess the word letter by letter";

/// Requests from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    CreateUser { user_name: String, email: Option<String> },
    NewGame { user_name: String, min: Option<usize>, max: Option<usize> },
    GetGame { game_id: GameId },
    MakeMove { game_id: GameId, guess: String },
    CancelGame { game_id: GameId },
    GetUserGames { user_name: String },
    GetGameHistory { game_id: GameId },
    GetScores,
    GetUserScores { user_name: String },
    GetHighScores { limit: Option<usize> },
    GetUserRankings,
    GetAverageAttempts,
}

/// Responses from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Sent first on every connection
    ServerInfo { name: String, version: String, description: String },
    Message(String),
    Game(GameView),
    Cancelled(CancelView),
    Games(Vec<GameView>),
    History(GameHistory),
    Scores(Vec<ScoreView>),
    Rankings(Vec<UserRanking>),
    Error(String),
}

impl ServerMessage {
    pub fn server_info() -> Self {
        ServerMessage::ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: SERVER_DESCRIPTION.to_string(),
        }
    }
}

/// Player-facing snapshot of a game. The answer stays hidden until the game is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub user_name: String,
    pub attempts_remaining: u32,
    pub game_over: bool,
    pub status: GameStatus,
    pub revealed: String,
    pub wrong_guesses: String,
    pub message: String,
    pub answer: Option<String>,
}

impl GameView {
    pub fn new(game: &Game, user_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            game_id: game.id(),
            user_name: user_name.into(),
            attempts_remaining: game.attempts_remaining(),
            game_over: game.is_over(),
            status: game.status(),
            revealed: game.revealed(),
            wrong_guesses: game.wrong_guesses().iter().collect(),
            message: message.into(),
            answer: game.is_over().then(|| game.target()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelView {
    pub game_id: GameId,
    pub cancelled: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub user_name: String,
    /// ISO 8601 date (`YYYY-MM-DD`)
    pub date: String,
    pub won: bool,
    pub game_score: u32,
}

/// Guesses in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    pub game_id: GameId,
    pub guesses: Vec<char>,
    pub correct: Vec<char>,
    pub wrong: Vec<char>,
    pub revealed: String,
    pub attempts_remaining: u32,
    pub game_over: bool,
}

impl From<&Game> for GameHistory {
    fn from(game: &Game) -> Self {
        Self {
            game_id: game.id(),
            guesses: game.all_guesses().to_vec(),
            correct: game.correct_guesses().to_vec(),
            wrong: game.wrong_guesses().to_vec(),
            revealed: game.revealed(),
            attempts_remaining: game.attempts_remaining(),
            game_over: game.is_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_client_message_json_shape() {
        let id = Uuid::nil();
        let msg = ClientMessage::MakeMove { game_id: id, guess: "a".into() };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"MakeMove":{"game_id":"00000000-0000-0000-0000-000000000000","guess":"a"}}"#
        );
        assert_eq!(serde_json::to_string(&ClientMessage::GetScores).unwrap(), r#""GetScores""#);
    }

    #[test]
    fn test_parse_client_json() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"NewGame":{"user_name":"ada","min":3,"max":null}}"#).unwrap();
        assert_eq!(msg, ClientMessage::NewGame { user_name: "ada".into(), min: Some(3), max: None });
    }

    #[test]
    fn test_game_view_hides_answer_until_over() {
        let mut game = Game::new(Uuid::new_v4(), "ox");
        game.apply_guess("z");

        let view = GameView::new(&game, "ada", "Try again!");
        assert_eq!(view.answer, None);
        assert_eq!(view.revealed, "$$");
        assert_eq!(view.wrong_guesses, "z");
        assert!(!view.game_over);

        game.apply_guess("o");
        game.apply_guess("x");
        let view = GameView::new(&game, "ada", "You win!");
        assert_eq!(view.answer.as_deref(), Some("ox"));
        assert_eq!(view.status, GameStatus::Won);
        assert!(view.game_over);
    }

    #[test]
    fn test_history_keeps_order() {
        let mut game = Game::new(Uuid::new_v4(), "cat");
        for g in ["t", "z", "c", "t", "y"] {
            game.apply_guess(g);
        }
        let history = GameHistory::from(&game);
        assert_eq!(history.guesses, vec!['t', 'z', 'c', 'y']);
        assert_eq!(history.correct, vec!['t', 'c']);
        assert_eq!(history.wrong, vec!['z', 'y']);
        assert_eq!(history.revealed, "c$t");
        assert_eq!(history.attempts_remaining, 6);
    }
}
