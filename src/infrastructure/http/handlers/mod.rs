//! HTTP Handlers

mod jobs;
mod ping;
mod tts;
mod websocket;

pub use jobs::*;
pub use ping::*;
pub use tts::*;
pub use websocket::*;
