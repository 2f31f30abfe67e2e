//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the WebSocket server binds to.
    pub addr: String,
    /// Word list file; the bundled dictionary is used when unset.
    pub words_path: Option<PathBuf>,
    /// Length bounds used when a new-game request leaves them out.
    pub default_min_length: usize,
    pub default_max_length: usize,
    /// How often the average-attempts cache is recomputed.
    pub average_interval: Duration,
    /// How often reminders are swept for users with unfinished games.
    pub reminder_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:4000".to_string(),
            words_path: None,
            default_min_length: 1,
            default_max_length: 10,
            average_interval: Duration::from_secs(300),
            reminder_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `HANGMAN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let secs = |key: &str, default: Duration| {
            get(key)
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&n| n > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            addr: get("HANGMAN_ADDR").unwrap_or(defaults.addr),
            words_path: get("HANGMAN_WORDS").map(PathBuf::from),
            default_min_length: get("HANGMAN_MIN_LENGTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_min_length),
            default_max_length: get("HANGMAN_MAX_LENGTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_max_length),
            average_interval: secs("HANGMAN_AVERAGE_SECS", defaults.average_interval),
            reminder_interval: secs("HANGMAN_REMINDER_SECS", defaults.reminder_interval),
        }
    }
}
