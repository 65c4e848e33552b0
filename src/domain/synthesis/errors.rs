//! Synthesis Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SynthesisDomainError {
    #[error("无效的分块大小: {0}")]
    InvalidChunkSize(usize),

    #[error("语速必须在 0.5 到 2.0 之间: {0}")]
    InvalidSpeakingRate(f32),

    #[error("音色标识不能为空")]
    EmptyVoiceId,

    #[error("未知的合成引擎: {0}")]
    UnknownEngine(String),
}
