//! Speech Engine Adapters - 语音合成引擎客户端

mod cloud_tts_client;
mod fake_tts_client;
mod gemini_tts_client;
mod http_support;

pub use cloud_tts_client::{CloudTtsClient, CloudTtsClientConfig};
pub use fake_tts_client::{FakeTtsClient, FakeTtsClientConfig};
pub use gemini_tts_client::{GeminiTtsClient, GeminiTtsClientConfig};
