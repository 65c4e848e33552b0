//! Synthesis Context - 长文本语音合成上下文
//!
//! 职责:
//! - 引擎能力描述（分块大小、重试节奏、是否需要交叉淡化）
//! - 语速、音色等值对象

mod engine;
mod errors;
mod value_objects;

pub use engine::{EngineKind, EngineProfile};
pub use errors::SynthesisDomainError;
pub use value_objects::{SpeakingRate, VoiceId, PREVIEW_TEXT};
