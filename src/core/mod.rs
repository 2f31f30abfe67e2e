pub mod engine;
pub mod game;
pub mod protocol;
pub mod score;
pub mod terminal;  // Terminal context wrapper
pub mod words;

// WebSocket server, one JSON request per text frame
pub mod websocket;
