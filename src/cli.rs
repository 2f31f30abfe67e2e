use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::info;

use crate::client::HangmanClient;
use crate::config::ServerConfig;
use crate::core::engine::GameEngine;
use crate::core::game::GameId;
use crate::core::protocol::{GameView, ScoreView};
use crate::core::score::UserRanking;
use crate::core::websocket::HangmanServer;
use crate::core::words::WordDictionary;
use crate::jobs::{spawn_average_attempts_job, spawn_reminder_job};
use crate::service::HangmanService;
use crate::store::MemStore;

const DEFAULT_SERVER: &str = "127.0.0.1:4000";

#[derive(Parser)]
#[command(name = "hangman")]
#[command(about = "🎩 Multiplayer hangman over WebSockets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where a client command connects to
#[derive(Args, Clone)]
pub struct Remote {
    /// Server address (e.g., "127.0.0.1:4000" or "ws://host:4000")
    #[arg(short, long, env = "HANGMAN_SERVER", default_value = DEFAULT_SERVER)]
    pub addr: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the game server
    Serve {
        /// Address to bind to; overrides HANGMAN_ADDR
        #[arg(short, long)]
        addr: Option<String>,

        /// Word list, one word per line; overrides HANGMAN_WORDS
        #[arg(short, long)]
        words: Option<PathBuf>,
    },
    /// Register a player
    User {
        name: String,

        #[arg(short, long)]
        email: Option<String>,

        #[command(flatten)]
        remote: Remote,
    },
    /// Start a new game, or resume one with --game, and play it in the terminal
    Play {
        name: String,

        /// Shortest word allowed
        #[arg(long)]
        min: Option<usize>,

        /// Longest word allowed
        #[arg(long)]
        max: Option<usize>,

        /// Resume this game instead of starting a new one
        #[arg(short, long)]
        game: Option<GameId>,

        #[command(flatten)]
        remote: Remote,
    },
    /// List a player's unfinished games
    Games {
        name: String,

        #[command(flatten)]
        remote: Remote,
    },
    /// Cancel an unfinished game
    Cancel {
        game_id: GameId,

        #[command(flatten)]
        remote: Remote,
    },
    /// Show the guesses made in a game
    History {
        game_id: GameId,

        #[command(flatten)]
        remote: Remote,
    },
    /// List finished games, optionally for one player
    Scores {
        #[arg(short, long)]
        user: Option<String>,

        #[command(flatten)]
        remote: Remote,
    },
    /// Best finished games
    HighScores {
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        remote: Remote,
    },
    /// Players ordered by average score
    Rankings {
        #[command(flatten)]
        remote: Remote,
    },
    /// Average attempts remaining across active games
    Average {
        #[command(flatten)]
        remote: Remote,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { addr, words }) => {
            let mut config = ServerConfig::from_env();
            if let Some(addr) = addr {
                config.addr = addr;
            }
            if words.is_some() {
                config.words_path = words;
            }
            serve(config).await?;
        }
        Some(Commands::User { name, email, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            println!("✅ {}", client.create_user(&name, email).await?);
        }
        Some(Commands::Play { name, min, max, game, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            let view = match game {
                Some(game_id) => {
                    let view = client.get_game(game_id).await?;
                    client.resume(&name, view).await?
                }
                None => client.play(&name, min, max).await?,
            };
            print_result(&view);
        }
        Some(Commands::Games { name, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            print_games(&client.user_games(&name).await?);
        }
        Some(Commands::Cancel { game_id, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            println!("{}", client.cancel_game(game_id).await?.message);
        }
        Some(Commands::History { game_id, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            let history = client.game_history(game_id).await?;
            println!("📜 Game {}", history.game_id);
            println!("   Guesses: {}", join_chars(&history.guesses));
            println!("   Correct: {}", join_chars(&history.correct));
            println!("   Wrong:   {}", join_chars(&history.wrong));
            println!("   Tries left: {}", history.attempts_remaining);
            if history.game_over {
                println!("   🏁 Game over");
            }
        }
        Some(Commands::Scores { user, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            print_scores(&client.scores(user.as_deref()).await?);
        }
        Some(Commands::HighScores { limit, remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            print_scores(&client.high_scores(limit).await?);
        }
        Some(Commands::Rankings { remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            print_rankings(&client.user_rankings().await?);
        }
        Some(Commands::Average { remote }) => {
            let mut client = HangmanClient::connect(&remote.addr).await?;
            println!("{}", client.average_attempts().await?);
        }
        None => {
            // No subcommand provided - show interactive menu
            show_main_menu().await?;
        }
    }

    Ok(())
}

/// Build the service from `config`, start the background jobs and serve until the listener fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let words = match &config.words_path {
        Some(path) => WordDictionary::load(path)?,
        None => WordDictionary::builtin(),
    };
    info!(words = words.len(), "word list loaded");

    let service = Arc::new(
        HangmanService::new(GameEngine::new(words), Arc::new(MemStore::new()))
            .with_default_lengths(config.default_min_length, config.default_max_length),
    );

    spawn_average_attempts_job(Arc::clone(&service), config.average_interval);
    spawn_reminder_job(Arc::clone(&service), config.reminder_interval);

    println!("🚀 Starting hangman server on {}", config.addr);
    HangmanServer::bind(&config.addr, service).await?.run().await
}

async fn show_main_menu() -> Result<()> {
    println!("🎩 Welcome to Hangman!");
    println!("   Guess the word before the gallows is complete");
    println!();

    let options = vec![
        "🚀 Start a server",
        "👤 Register a player",
        "🎮 Play a game",
        "📋 My unfinished games",
        "🏆 High scores",
        "📊 Rankings",
        "🚪 Exit",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What would you like to do?")
        .items(&options)
        .interact()?;

    if selection == 0 {
        let mut config = ServerConfig::from_env();
        config.addr = prompt("Server address", &config.addr)?;
        return serve(config).await;
    }
    if selection == options.len() - 1 {
        println!("👋 Goodbye!");
        return Ok(());
    }

    let addr = prompt("Server address", DEFAULT_SERVER)?;
    let mut client = HangmanClient::connect(&addr).await?;

    match selection {
        1 => {
            let name = prompt("Your name", "")?;
            let email: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Email (optional)")
                .allow_empty(true)
                .interact_text()?;
            let email = Some(email.trim().to_string()).filter(|e| !e.is_empty());
            println!("✅ {}", client.create_user(&name, email).await?);
        }
        2 => {
            let name = prompt("Your name", "")?;
            let view = client.play(&name, None, None).await?;
            print_result(&view);
        }
        3 => {
            let name = prompt("Your name", "")?;
            let games = client.user_games(&name).await?;
            if games.is_empty() {
                println!("No unfinished games.");
                return Ok(());
            }
            let items: Vec<String> = games
                .iter()
                .map(|g| format!("{}  {}  ({} tries left)", g.game_id, g.revealed, g.attempts_remaining))
                .collect();
            let picked = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("🎮 Select a game to resume")
                .items(&items)
                .interact()?;
            let view = client.resume(&name, games[picked].clone()).await?;
            print_result(&view);
        }
        4 => print_scores(&client.high_scores(Some(10)).await?),
        5 => print_rankings(&client.user_rankings().await?),
        _ => unreachable!(),
    }

    Ok(())
}

fn prompt(label: &str, default: &str) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(label);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    Ok(input.interact_text()?.trim().to_string())
}

fn print_result(view: &GameView) {
    println!("📢 {}", view.message);
    if let Some(answer) = &view.answer {
        println!("   The word was '{answer}'.");
    }
    if !view.game_over {
        println!("   Resume later with: hangman play {} --game {}", view.user_name, view.game_id);
    }
}

fn print_games(games: &[GameView]) {
    if games.is_empty() {
        println!("No unfinished games.");
        return;
    }
    println!("🎮 Unfinished games:");
    for game in games {
        println!("   {}  {}  ({} tries left)", game.game_id, game.revealed, game.attempts_remaining);
    }
}

fn print_scores(scores: &[ScoreView]) {
    if scores.is_empty() {
        println!("No scores yet.");
        return;
    }
    println!("🏆 Scores:");
    for s in scores {
        let result = if s.won { "won " } else { "lost" };
        println!("   {:<16} {}  {}  {:>4}", s.user_name, s.date, result, s.game_score);
    }
}

fn print_rankings(rankings: &[UserRanking]) {
    if rankings.is_empty() {
        println!("No players yet.");
        return;
    }
    println!("📊 Rankings:");
    for (i, r) in rankings.iter().enumerate() {
        println!(
            "   {:>2}. {:<16} avg {:>7.2}  total {:>5}  games {:>3}",
            i + 1,
            r.user_name,
            r.user_score,
            r.total_game_score,
            r.total_games_played
        );
    }
}

fn join_chars(chars: &[char]) -> String {
    chars.iter().map(char::to_string).collect::<Vec<_>>().join(" ")
}
