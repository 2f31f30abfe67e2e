/// WebSocket client for the hangman service - request/response plus an interactive play loop
use anyhow::{anyhow, bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::client::renderer::HangmanRenderer;
use crate::core::game::{GameId, GameStatus};
use crate::core::protocol::{CancelView, ClientMessage, GameHistory, GameView, ScoreView, ServerMessage};
use crate::core::score::UserRanking;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Command typed at the play prompt that cancels the current game
pub const CANCEL_COMMAND: &str = "/cancel";

pub struct HangmanClient {
    sender: SplitSink<WsStream, Message>,
    receiver: SplitStream<WsStream>,
    server_name: String,
    server_version: String,
}

/// Accepts `host:port` or a full `ws://` / `wss://` URL.
pub fn server_url(addr: &str) -> String {
    if addr.starts_with("ws://") || addr.starts_with("wss://") {
        addr.to_string()
    } else {
        format!("ws://{addr}")
    }
}

impl HangmanClient {
    /// Connect and read the server's greeting.
    pub async fn connect(addr: &str) -> Result<Self> {
        let url = server_url(addr);
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| anyhow!("Failed to connect to {url}: {e}"))?;
        let (sender, receiver) = ws_stream.split();

        let mut client = Self {
            sender,
            receiver,
            server_name: String::new(),
            server_version: String::new(),
        };

        match client.next_message().await? {
            ServerMessage::ServerInfo { name, version, .. } => {
                debug!(%name, %version, "connected");
                client.server_name = name;
                client.server_version = version;
                Ok(client)
            }
            other => Err(anyhow!("Expected server info, got {other:?}")),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Send one request and wait for its response. `ServerMessage::Error` is returned as is.
    pub async fn request(&mut self, msg: &ClientMessage) -> Result<ServerMessage> {
        let json = serde_json::to_string(msg)?;
        self.sender.send(Message::Text(json)).await?;
        self.next_message().await
    }

    async fn next_message(&mut self) -> Result<ServerMessage> {
        while let Some(msg) = self.receiver.next().await {
            match msg? {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => break,
                _ => {}
            }
        }
        bail!("Connection closed by server")
    }

    pub async fn create_user(&mut self, user_name: &str, email: Option<String>) -> Result<String> {
        let msg = ClientMessage::CreateUser { user_name: user_name.to_string(), email };
        match self.request(&msg).await? {
            ServerMessage::Message(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    pub async fn new_game(&mut self, user_name: &str, min: Option<usize>, max: Option<usize>) -> Result<GameView> {
        let msg = ClientMessage::NewGame { user_name: user_name.to_string(), min, max };
        expect_game(self.request(&msg).await?)
    }

    pub async fn get_game(&mut self, game_id: GameId) -> Result<GameView> {
        expect_game(self.request(&ClientMessage::GetGame { game_id }).await?)
    }

    pub async fn make_move(&mut self, game_id: GameId, guess: &str) -> Result<GameView> {
        let msg = ClientMessage::MakeMove { game_id, guess: guess.to_string() };
        expect_game(self.request(&msg).await?)
    }

    pub async fn cancel_game(&mut self, game_id: GameId) -> Result<CancelView> {
        match self.request(&ClientMessage::CancelGame { game_id }).await? {
            ServerMessage::Cancelled(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    pub async fn user_games(&mut self, user_name: &str) -> Result<Vec<GameView>> {
        let msg = ClientMessage::GetUserGames { user_name: user_name.to_string() };
        match self.request(&msg).await? {
            ServerMessage::Games(games) => Ok(games),
            other => Err(unexpected(other)),
        }
    }

    pub async fn game_history(&mut self, game_id: GameId) -> Result<GameHistory> {
        match self.request(&ClientMessage::GetGameHistory { game_id }).await? {
            ServerMessage::History(history) => Ok(history),
            other => Err(unexpected(other)),
        }
    }

    /// All scores, or one user's scores.
    pub async fn scores(&mut self, user_name: Option<&str>) -> Result<Vec<ScoreView>> {
        let msg = match user_name {
            Some(name) => ClientMessage::GetUserScores { user_name: name.to_string() },
            None => ClientMessage::GetScores,
        };
        expect_scores(self.request(&msg).await?)
    }

    pub async fn high_scores(&mut self, limit: Option<usize>) -> Result<Vec<ScoreView>> {
        expect_scores(self.request(&ClientMessage::GetHighScores { limit }).await?)
    }

    pub async fn user_rankings(&mut self) -> Result<Vec<UserRanking>> {
        match self.request(&ClientMessage::GetUserRankings).await? {
            ServerMessage::Rankings(rankings) => Ok(rankings),
            other => Err(unexpected(other)),
        }
    }

    pub async fn average_attempts(&mut self) -> Result<String> {
        match self.request(&ClientMessage::GetAverageAttempts).await? {
            ServerMessage::Message(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    /// Start a new game for `user_name` and play it in the terminal.
    pub async fn play(&mut self, user_name: &str, min: Option<usize>, max: Option<usize>) -> Result<GameView> {
        let view = self.new_game(user_name, min, max).await?;
        self.resume(user_name, view).await
    }

    /// Play an existing game in the terminal until it ends or the player quits.
    pub async fn resume(&mut self, user_name: &str, view: GameView) -> Result<GameView> {
        let renderer = HangmanRenderer::new(user_name);

        terminal::enable_raw_mode()?;
        let result = self.run_game_loop(view, &renderer).await;
        terminal::disable_raw_mode()?;
        println!();

        result
    }

    async fn run_game_loop(&mut self, mut view: GameView, renderer: &HangmanRenderer) -> Result<GameView> {
        let mut input_line = String::new();
        renderer.render(&view, &input_line)?;

        loop {
            if !event::poll(Duration::from_millis(50))? {
                tokio::task::yield_now().await;
                continue;
            }

            let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? else {
                continue;
            };

            match code {
                KeyCode::Esc => break,
                KeyCode::Enter if view.game_over => break,
                KeyCode::Enter => {
                    let line = std::mem::take(&mut input_line);
                    if line.trim() == CANCEL_COMMAND {
                        let cancel = self.cancel_game(view.game_id).await?;
                        if cancel.cancelled {
                            view.game_over = true;
                            view.status = GameStatus::Cancelled;
                        }
                        view.message = cancel.message;
                    } else if !line.is_empty() {
                        view = self.make_move(view.game_id, &line).await?;
                    }
                }
                KeyCode::Backspace => {
                    input_line.pop();
                }
                KeyCode::Char(c) => input_line.push(c),
                _ => {}
            }

            renderer.render(&view, &input_line)?;
        }

        Ok(view)
    }
}

fn unexpected(msg: ServerMessage) -> anyhow::Error {
    match msg {
        ServerMessage::Error(err) => anyhow!(err),
        other => anyhow!("Unexpected response from server: {other:?}"),
    }
}

fn expect_game(msg: ServerMessage) -> Result<GameView> {
    match msg {
        ServerMessage::Game(view) => Ok(view),
        other => Err(unexpected(other)),
    }
}

fn expect_scores(msg: ServerMessage) -> Result<Vec<ScoreView>> {
    match msg {
        ServerMessage::Scores(scores) => Ok(scores),
        other => Err(unexpected(other)),
    }
}
