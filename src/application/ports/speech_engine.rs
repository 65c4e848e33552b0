//! Speech Engine Port - 语音合成引擎抽象
//!
//! 一次调用合成一个文本块，返回原始 PCM。具体实现在 infrastructure/adapters/tts

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::PcmFormat;
use crate::domain::synthesis::{EngineKind, SpeakingRate, VoiceId};

/// 引擎调用错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpeechError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 单次请求超过客户端超时，与其他传输错误一样可重试
    #[error("Request timed out")]
    Timeout,

    #[error("Service error: HTTP {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Malformed audio: {0}")]
    MalformedAudio(String),

    #[error("Engine not configured: {0}")]
    NotConfigured(String),
}

impl SpeechError {
    /// 是否值得重试
    ///
    /// 只有缺少凭据不会因为重试而改变结果。
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SpeechError::NotConfigured(_))
    }
}

/// 单块合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: VoiceId,
    /// 只有支持原生语速的引擎才会收到 Some
    pub speaking_rate: Option<SpeakingRate>,
    /// 期望的输出格式（LINEAR16）
    pub format: PcmFormat,
}

/// 单块合成结果
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// 去掉容器头后的 PCM 数据
    pub pcm: Vec<u8>,
    pub format: PcmFormat,
}

/// Speech Engine Port
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 引擎类型
    fn kind(&self) -> EngineKind;

    /// 合成一个文本块
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError>;
}
