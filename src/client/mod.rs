pub mod renderer;
pub mod websocket_client;

pub use websocket_client::HangmanClient;
