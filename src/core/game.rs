/// Hangman game state machine - pure game logic, no transport or storage concerns
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::score::{Score, UserId};

pub type GameId = Uuid;

/// Attempts a player starts with.
pub const MAX_ATTEMPTS: u32 = 8;

/// Marks an unrevealed position. Must not be alphabetic.
pub const PLACEHOLDER: char = '$';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
    Cancelled,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Result of a single `apply_guess` call.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    AlreadyOver,
    NotSingleLetter,
    NotALetter,
    Revealed { revealed: String },
    Won { score: Score },
    AlreadyFound { revealed: String },
    AlreadyTried { revealed: String },
    Missed { revealed: String },
    Lost { score: Score },
}

impl GuessOutcome {
    /// Whether the guess mutated the game (and so needs saving).
    pub fn changes_state(&self) -> bool {
        matches!(
            self,
            GuessOutcome::Revealed { .. }
                | GuessOutcome::Won { .. }
                | GuessOutcome::Missed { .. }
                | GuessOutcome::Lost { .. }
        )
    }

    /// Score emitted when the guess ended the game.
    pub fn score(&self) -> Option<&Score> {
        match self {
            GuessOutcome::Won { score } | GuessOutcome::Lost { score } => Some(score),
            _ => None,
        }
    }
}

impl fmt::Display for GuessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessOutcome::AlreadyOver => write!(f, "Game already over!"),
            GuessOutcome::NotSingleLetter => write!(f, "Valid guesses are one letter only!"),
            GuessOutcome::NotALetter => write!(f, "Letters only!"),
            GuessOutcome::Revealed { revealed } => {
                write!(f, "Nice! This is what you have left: {revealed}")
            }
            GuessOutcome::Won { .. } => write!(f, "You win!"),
            GuessOutcome::AlreadyFound { revealed } => {
                write!(f, "You already got that letter! This is what you have left: {revealed}")
            }
            GuessOutcome::AlreadyTried { revealed } => {
                write!(f, "You already tried that letter! This is what you have left: {revealed}")
            }
            GuessOutcome::Missed { revealed } => {
                write!(f, "Try again! This is what you have left: {revealed}")
            }
            GuessOutcome::Lost { .. } => write!(f, "Game over!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyOver,
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelOutcome::Cancelled => write!(f, "Game cancelled!"),
            CancelOutcome::AlreadyOver => write!(f, "Game is already over. Cannot cancel."),
        }
    }
}

/// One game session. Fields are private so the invariants below hold:
/// `revealed.len() == target.len()`, a letter sits in at most one of
/// `wrong_guesses`/`correct_guesses`, attempts never increase, and a
/// finished game never reopens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    owner: UserId,
    target: Vec<char>,
    revealed: Vec<char>,
    attempts_remaining: u32,
    status: GameStatus,
    wrong_guesses: Vec<char>,
    correct_guesses: Vec<char>,
    all_guesses: Vec<char>,
}

impl Game {
    pub fn new(owner: UserId, target: &str) -> Self {
        let target: Vec<char> = target.to_lowercase().chars().collect();
        let revealed = vec![PLACEHOLDER; target.len()];

        Self {
            id: Uuid::new_v4(),
            owner,
            target,
            revealed,
            attempts_remaining: MAX_ATTEMPTS,
            status: GameStatus::InProgress,
            wrong_guesses: Vec::new(),
            correct_guesses: Vec::new(),
            all_guesses: Vec::new(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn revealed(&self) -> String {
        self.revealed.iter().collect()
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn wrong_guesses(&self) -> &[char] {
        &self.wrong_guesses
    }

    pub fn correct_guesses(&self) -> &[char] {
        &self.correct_guesses
    }

    pub fn all_guesses(&self) -> &[char] {
        &self.all_guesses
    }

    /// Evaluate one raw guess. The checks run in a fixed order: finished game,
    /// length, alphabetic, new correct letter, already found, already tried,
    /// new wrong letter.
    pub fn apply_guess(&mut self, raw_guess: &str) -> GuessOutcome {
        if self.is_over() {
            return GuessOutcome::AlreadyOver;
        }

        let mut chars = raw_guess.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return GuessOutcome::NotSingleLetter,
        };

        if !letter.is_alphabetic() {
            return GuessOutcome::NotALetter;
        }

        let guess = letter.to_lowercase().next().unwrap_or(letter);
        let already_found = self.revealed.contains(&guess);

        if self.target.contains(&guess) && !already_found {
            for (slot, &c) in self.revealed.iter_mut().zip(&self.target) {
                if c == guess {
                    *slot = guess;
                }
            }
            if !self.correct_guesses.contains(&guess) {
                self.correct_guesses.push(guess);
            }
            self.all_guesses.push(guess);

            if !self.revealed.contains(&PLACEHOLDER) {
                let score = self.end_game(true);
                return GuessOutcome::Won { score };
            }
            return GuessOutcome::Revealed { revealed: self.revealed() };
        }

        if already_found {
            return GuessOutcome::AlreadyFound { revealed: self.revealed() };
        }

        if self.wrong_guesses.contains(&guess) {
            return GuessOutcome::AlreadyTried { revealed: self.revealed() };
        }

        self.wrong_guesses.push(guess);
        self.all_guesses.push(guess);
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);

        if self.attempts_remaining == 0 {
            let score = self.end_game(false);
            return GuessOutcome::Lost { score };
        }

        GuessOutcome::Missed { revealed: self.revealed() }
    }

    /// Cancel an in-progress game. No score is produced.
    pub fn cancel(&mut self) -> CancelOutcome {
        if self.is_over() {
            return CancelOutcome::AlreadyOver;
        }
        self.status = GameStatus::Cancelled;
        CancelOutcome::Cancelled
    }

    /// Only reachable from the win/loss branches of `apply_guess`, which are
    /// themselves guarded by the finished-game check.
    fn end_game(&mut self, won: bool) -> Score {
        self.status = if won { GameStatus::Won } else { GameStatus::Lost };

        let game_score = if won {
            self.attempts_remaining * self.target.len() as u32
        } else {
            0
        };

        Score {
            user: self.owner,
            date: Utc::now().date_naive(),
            won,
            game_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(target: &str) -> Game {
        Game::new(Uuid::new_v4(), target)
    }

    #[test]
    fn test_new_game_is_all_placeholders() {
        let g = game("Rust");
        assert_eq!(g.target(), "rust");
        assert_eq!(g.revealed(), "$$$$");
        assert_eq!(g.attempts_remaining(), MAX_ATTEMPTS);
        assert_eq!(g.status(), GameStatus::InProgress);
        assert!(g.all_guesses().is_empty());
    }

    #[test]
    fn test_win_scenario() {
        let mut g = game("cat");

        assert_eq!(g.apply_guess("c").to_string(), "Nice! This is what you have left: c$$");
        assert_eq!(g.apply_guess("a").to_string(), "Nice! This is what you have left: ca$");

        let outcome = g.apply_guess("t");
        assert_eq!(outcome.to_string(), "You win!");
        assert!(g.is_over());
        assert_eq!(g.status(), GameStatus::Won);
        assert_eq!(g.attempts_remaining(), 8);

        let score = outcome.score().unwrap();
        assert!(score.won);
        assert_eq!(score.game_score, 8 * 3);
        assert_eq!(score.user, g.owner());
    }

    #[test]
    fn test_loss_scenario() {
        let mut g = game("dog");
        g.attempts_remaining = 1;

        let outcome = g.apply_guess("z");
        assert_eq!(outcome.to_string(), "Game over!");
        assert_eq!(g.attempts_remaining(), 0);
        assert_eq!(g.status(), GameStatus::Lost);

        let score = outcome.score().unwrap();
        assert!(!score.won);
        assert_eq!(score.game_score, 0);
    }

    #[test]
    fn test_eight_misses_lose() {
        let mut g = game("dog");
        for (i, letter) in ["a", "b", "c", "e", "f", "h", "i"].iter().enumerate() {
            let outcome = g.apply_guess(letter);
            assert!(matches!(outcome, GuessOutcome::Missed { .. }));
            assert_eq!(g.attempts_remaining(), MAX_ATTEMPTS - 1 - i as u32);
        }
        assert!(matches!(g.apply_guess("j"), GuessOutcome::Lost { .. }));
        assert_eq!(g.wrong_guesses().len(), 8);
    }

    #[test]
    fn test_reveals_every_occurrence() {
        let mut g = game("banana");
        g.apply_guess("a");
        assert_eq!(g.revealed(), "$a$a$a");
        g.apply_guess("n");
        assert_eq!(g.revealed(), "$anana");
        assert_eq!(g.correct_guesses(), &['a', 'n']);
    }

    #[test]
    fn test_repeat_correct_letter_is_free() {
        let mut g = game("cat");
        g.apply_guess("c");
        let before = g.clone();

        let outcome = g.apply_guess("c");
        assert_eq!(
            outcome.to_string(),
            "You already got that letter! This is what you have left: c$$"
        );
        assert!(!outcome.changes_state());
        assert_eq!(g, before);
    }

    #[test]
    fn test_repeat_wrong_letter_is_free() {
        let mut g = game("cat");
        g.apply_guess("z");
        assert_eq!(g.attempts_remaining(), 7);
        let before = g.clone();

        let outcome = g.apply_guess("z");
        assert_eq!(
            outcome.to_string(),
            "You already tried that letter! This is what you have left: $$$"
        );
        assert_eq!(g, before);
        assert_eq!(g.wrong_guesses(), &['z']);
    }

    #[test]
    fn test_uppercase_guess_is_normalized() {
        let mut g = game("cat");
        assert!(matches!(g.apply_guess("C"), GuessOutcome::Revealed { .. }));
        assert!(matches!(g.apply_guess("c"), GuessOutcome::AlreadyFound { .. }));
        assert_eq!(g.all_guesses(), &['c']);
    }

    #[test]
    fn test_rejects_bad_input_without_mutation() {
        let mut g = game("cat");
        let before = g.clone();

        assert_eq!(g.apply_guess("ab").to_string(), "Valid guesses are one letter only!");
        assert_eq!(g.apply_guess("").to_string(), "Valid guesses are one letter only!");
        assert_eq!(g.apply_guess("5").to_string(), "Letters only!");
        assert_eq!(g.apply_guess("$").to_string(), "Letters only!");
        assert_eq!(g, before);
    }

    #[test]
    fn test_finished_game_ignores_everything() {
        let mut g = game("ox");
        g.apply_guess("o");
        g.apply_guess("x");
        assert!(g.is_over());
        let before = g.clone();

        for guess in ["o", "q", "ab", "5", ""] {
            assert_eq!(g.apply_guess(guess), GuessOutcome::AlreadyOver);
            assert_eq!(g.apply_guess(guess).to_string(), "Game already over!");
        }
        assert_eq!(g, before);
    }

    #[test]
    fn test_cancel() {
        let mut g = game("cat");
        assert_eq!(g.cancel(), CancelOutcome::Cancelled);
        assert_eq!(g.status(), GameStatus::Cancelled);
        assert!(g.is_over());
        assert_eq!(g.apply_guess("c"), GuessOutcome::AlreadyOver);

        assert_eq!(g.cancel().to_string(), "Game is already over. Cannot cancel.");
    }

    #[test]
    fn test_cannot_cancel_won_game() {
        let mut g = game("ox");
        g.apply_guess("o");
        g.apply_guess("x");
        assert_eq!(g.cancel(), CancelOutcome::AlreadyOver);
        assert_eq!(g.status(), GameStatus::Won);
    }

    #[test]
    fn test_score_uses_remaining_attempts() {
        let mut g = game("cat");
        g.apply_guess("q");
        g.apply_guess("w");
        g.apply_guess("c");
        g.apply_guess("a");
        let outcome = g.apply_guess("t");
        assert_eq!(outcome.score().map(|s| s.game_score), Some(6 * 3));
        assert_eq!(g.all_guesses(), &['q', 'w', 'c', 'a', 't']);
    }
}
