//! Synthesis Commands - 长音频合成与试听

use crate::application::error::ApplicationError;
use crate::application::services::LongAudioRequest;
use crate::domain::synthesis::{EngineKind, SpeakingRate, VoiceId};

/// 同步合成长音频命令
#[derive(Debug, Clone)]
pub struct SynthesizeLongAudioCommand {
    pub text: String,
    pub voice_name: String,
    pub engine: EngineKind,
    /// 缺省为 1.0
    pub speaking_rate: Option<f32>,
}

impl SynthesizeLongAudioCommand {
    /// 校验并转换为流水线请求
    pub fn into_request(self, max_text_chars: usize) -> Result<LongAudioRequest, ApplicationError> {
        build_request(
            self.text,
            &self.voice_name,
            self.engine,
            self.speaking_rate,
            max_text_chars,
        )
    }
}

/// 同步合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeLongAudioResponse {
    /// 完整的 WAV 文件
    pub audio_data: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
    pub engine: EngineKind,
    pub chunk_count: usize,
    pub duration_ms: u64,
    pub elapsed_secs: u64,
}

/// 音色试听命令
#[derive(Debug, Clone)]
pub struct PreviewVoiceCommand {
    pub voice_name: String,
    pub engine: EngineKind,
    pub speaking_rate: Option<f32>,
}

/// 音色试听响应
#[derive(Debug, Clone)]
pub struct PreviewVoiceResponse {
    pub audio_data: Vec<u8>,
    pub content_type: String,
    pub duration_ms: u64,
}

/// 下载文件名: story_audio_<毫秒时间戳>.<ext>
pub fn audio_file_name(extension: &str) -> String {
    format!(
        "story_audio_{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension
    )
}

pub(crate) fn build_request(
    text: String,
    voice_name: &str,
    engine: EngineKind,
    speaking_rate: Option<f32>,
    max_text_chars: usize,
) -> Result<LongAudioRequest, ApplicationError> {
    let character_count = text.chars().count();
    if character_count > max_text_chars {
        return Err(ApplicationError::validation(format!(
            "Text is {} characters, maximum is {}",
            character_count, max_text_chars
        )));
    }

    let voice_id = VoiceId::new(voice_name)?;
    let speaking_rate = match speaking_rate {
        Some(rate) => SpeakingRate::new(rate)?,
        None => SpeakingRate::default(),
    };

    Ok(LongAudioRequest {
        text,
        voice_id,
        engine,
        speaking_rate,
    })
}
