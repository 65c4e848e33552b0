//! Audio Encoder Port - 音频容器封装抽象
//!
//! 把拼接好的 PCM 封装成可下载的容器（目前只有 WAV）

use serde::Serialize;
use thiserror::Error;

use crate::domain::audio::PcmFormat;

/// 封装错误
#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large for container: {0} bytes")]
    TooLarge(usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// 音频信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    /// 时长（毫秒）
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// PCM 数据大小（字节）
    pub data_size: usize,
}

/// Audio Encoder Port
pub trait AudioEncoderPort: Send + Sync {
    /// 封装 PCM
    fn encode(&self, pcm: &[u8], format: PcmFormat) -> Result<Vec<u8>, EncodeError>;

    /// 读取已封装音频的信息
    fn get_audio_info(&self, data: &[u8]) -> Result<AudioInfo, EncodeError>;

    /// HTTP Content-Type
    fn content_type(&self) -> &'static str;

    /// 文件扩展名
    fn extension(&self) -> &'static str;
}
