/// WebSocket server exposing the hangman service - one JSON request, one JSON response
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use crate::core::protocol::{ClientMessage, ServerMessage};
use crate::error::ServiceError;
use crate::service::HangmanService;

pub struct HangmanServer {
    listener: TcpListener,
    service: Arc<HangmanService>,
}

impl HangmanServer {
    pub async fn bind(addr: &str, service: Arc<HangmanService>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, service })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails. Each connection gets its own task.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.listener.local_addr()?, "hangman server listening");

        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "new connection");
            tokio::spawn(handle_connection(stream, peer, Arc::clone(&self.service)));
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, service: Arc<HangmanService>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "websocket handshake failed");
            return;
        }
    };
    info!(%peer, "client connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    if send(&mut ws_sender, &ServerMessage::server_info()).await.is_err() {
        return;
    }

    while let Some(msg_result) = ws_receiver.next().await {
        let reply = match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(request) => dispatch(&service, request).await,
                Err(e) => ServerMessage::Error(format!("Malformed request: {e}")),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(%peer, error = %e, "websocket error");
                break;
            }
        };

        if send(&mut ws_sender, &reply).await.is_err() {
            break;
        }
    }

    info!(%peer, "client disconnected");
}

async fn send<S>(sink: &mut S, msg: &ServerMessage) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}

/// Route one request to the service. Service errors become `ServerMessage::Error`.
pub async fn dispatch(service: &HangmanService, request: ClientMessage) -> ServerMessage {
    route(service, request).await.unwrap_or_else(|e| {
        debug!(error = %e, "request failed");
        ServerMessage::Error(e.to_string())
    })
}

async fn route(service: &HangmanService, request: ClientMessage) -> Result<ServerMessage, ServiceError> {
    Ok(match request {
        ClientMessage::CreateUser { user_name, email } => {
            ServerMessage::Message(service.create_user(&user_name, email).await?)
        }
        ClientMessage::NewGame { user_name, min, max } => {
            ServerMessage::Game(service.new_game(&user_name, min, max).await?)
        }
        ClientMessage::GetGame { game_id } => ServerMessage::Game(service.get_game(game_id).await?),
        ClientMessage::MakeMove { game_id, guess } => ServerMessage::Game(service.make_move(game_id, &guess).await?),
        ClientMessage::CancelGame { game_id } => ServerMessage::Cancelled(service.cancel_game(game_id).await?),
        ClientMessage::GetUserGames { user_name } => ServerMessage::Games(service.user_games(&user_name).await?),
        ClientMessage::GetGameHistory { game_id } => ServerMessage::History(service.game_history(game_id).await?),
        ClientMessage::GetScores => ServerMessage::Scores(service.scores().await?),
        ClientMessage::GetUserScores { user_name } => ServerMessage::Scores(service.user_scores(&user_name).await?),
        ClientMessage::GetHighScores { limit } => ServerMessage::Scores(service.high_scores(limit).await?),
        ClientMessage::GetUserRankings => ServerMessage::Rankings(service.user_rankings().await?),
        ClientMessage::GetAverageAttempts => ServerMessage::Message(service.average_attempts().await),
    })
}
