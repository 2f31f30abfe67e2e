/// Hangman renderer - draws a `GameView`, no game logic
use std::io;

use crate::core::game::{GameStatus, MAX_ATTEMPTS, PLACEHOLDER};
use crate::core::protocol::GameView;
use crate::core::terminal::{TerminalColor, TerminalContext};

const GALLOWS: [&str; 9] = [
    "      \n      \n      \n      \n      ",
    "      \n      \n      \n      \n_____ ",
    "  |   \n  |   \n  |   \n  |   \n__|__ ",
    "  +--+\n  |   \n  |   \n  |   \n__|__ ",
    "  +--+\n  |  O\n  |   \n  |   \n__|__ ",
    "  +--+\n  |  O\n  |  |\n  |   \n__|__ ",
    "  +--+\n  |  O\n  | /|\\\n  |   \n__|__ ",
    "  +--+\n  |  O\n  | /|\\\n  | / \n__|__ ",
    "  +--+\n  |  O\n  | /|\\\n  | / \\\n__|__ ",
];

pub struct HangmanRenderer {
    player_name: String,
}

impl HangmanRenderer {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self { player_name: player_name.into() }
    }

    pub fn render(&self, view: &GameView, input: &str) -> io::Result<()> {
        let mut ctx = TerminalContext::new();
        ctx.clear_screen()?;

        ctx.print_colored_line(&format!("🎩 HANGMAN - Player: {}", self.player_name), TerminalColor::Cyan)?;
        ctx.print_line("══════════════════════════════════")?;
        ctx.empty_line()?;

        for line in gallows(view.attempts_remaining).lines() {
            ctx.print_line(line)?;
        }
        ctx.empty_line()?;

        ctx.print_line(&format!("Word: {}", display_word(&view.revealed)))?;
        ctx.print_line(&format!(
            "Tries left: {} {}",
            view.attempts_remaining,
            "❤".repeat(view.attempts_remaining as usize)
        ))?;
        if !view.wrong_guesses.is_empty() {
            ctx.print_line(&format!("Wrong: {}", view.wrong_guesses))?;
        }
        ctx.empty_line()?;

        let color = match view.status {
            GameStatus::Won => TerminalColor::Green,
            GameStatus::Lost => TerminalColor::Red,
            GameStatus::Cancelled => TerminalColor::Yellow,
            GameStatus::InProgress => TerminalColor::Default,
        };
        ctx.print_colored_line(&format!("📢 {}", view.message), color)?;
        if let Some(answer) = &view.answer {
            ctx.print_line(&format!("The word was '{answer}'."))?;
        }
        ctx.empty_line()?;

        if view.game_over {
            ctx.print_line("🏁 Game over! Press Enter or Esc to quit")?;
        } else {
            ctx.print_line("💡 Type a letter and press Enter. /cancel cancels the game, Esc quits")?;
            ctx.print(&format!("> {input}"))?;
        }

        ctx.flush()
    }
}

/// `c$t` -> `c _ t`
pub fn display_word(revealed: &str) -> String {
    revealed
        .chars()
        .map(|c| if c == PLACEHOLDER { '_' } else { c })
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gallows drawing for the number of misses so far.
pub fn gallows(attempts_remaining: u32) -> &'static str {
    let misses = MAX_ATTEMPTS.saturating_sub(attempts_remaining) as usize;
    GALLOWS[misses.min(GALLOWS.len() - 1)]
}
