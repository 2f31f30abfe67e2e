/// Terminal rendering context that handles all the low-level terminal stuff
use std::io::{self, stdout, Stdout, Write};

use crossterm::{
    cursor,
    style::{Color, ResetColor, SetForegroundColor},
    terminal, QueueableCommand,
};

pub struct TerminalContext {
    out: Stdout,
}

impl TerminalContext {
    pub fn new() -> Self {
        Self { out: stdout() }
    }

    /// Clear the entire screen and position cursor
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    /// Print a line with a carriage return, raw mode does not add one
    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}\r\n")
    }

    pub fn print_colored_line(&mut self, text: &str, color: TerminalColor) -> io::Result<()> {
        self.out.queue(SetForegroundColor(color.into()))?;
        write!(self.out, "{text}\r\n")?;
        self.out.queue(ResetColor)?;
        Ok(())
    }

    pub fn empty_line(&mut self) -> io::Result<()> {
        write!(self.out, "\r\n")
    }

    /// Print text without newline
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}")
    }

    /// Flush all output at once - call this at the end of render
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Default for TerminalContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalColor {
    Red,
    Green,
    Yellow,
    Cyan,
    Default,
}

impl From<TerminalColor> for Color {
    fn from(color: TerminalColor) -> Self {
        match color {
            TerminalColor::Red => Color::Red,
            TerminalColor::Green => Color::Green,
            TerminalColor::Yellow => Color::Yellow,
            TerminalColor::Cyan => Color::Cyan,
            TerminalColor::Default => Color::Reset,
        }
    }
}
