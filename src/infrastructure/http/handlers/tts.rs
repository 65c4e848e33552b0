//! TTS Handlers - 同步长音频合成、试听、耗时估算

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::{
    EstimateDurationQuery, PreviewVoiceCommand, SynthesizeLongAudioCommand,
};
use crate::domain::audio::ProgressEstimate;
use crate::domain::synthesis::EngineKind;
use crate::infrastructure::events::TracingProgressSink;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Synthesize Long Audio
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeLongAudioRequest {
    pub text: String,
    #[serde(alias = "voiceName")]
    pub voice_name: String,
    pub engine: EngineKind,
    #[serde(default, alias = "speakingRate")]
    pub speaking_rate: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeLongAudioResponseDto {
    /// base64 编码的 WAV
    pub audio_data: String,
    pub mime_type: String,
    pub file_name: String,
    pub byte_length: usize,
    pub duration_ms: u64,
    pub chunk_count: usize,
    pub engine: EngineKind,
    pub elapsed_secs: u64,
}

/// 同步合成：请求在整段音频完成后返回，客户端断开即放弃合成
pub async fn synthesize_long_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeLongAudioRequest>,
) -> Result<Json<ApiResponse<SynthesizeLongAudioResponseDto>>, ApiError> {
    let cmd = SynthesizeLongAudioCommand {
        text: req.text,
        voice_name: req.voice_name,
        engine: req.engine,
        speaking_rate: req.speaking_rate,
    };

    let result = state
        .synthesize_handler
        .handle(cmd, Arc::new(TracingProgressSink), CancellationToken::new())
        .await?;

    Ok(Json(ApiResponse::success(SynthesizeLongAudioResponseDto {
        byte_length: result.audio_data.len(),
        audio_data: STANDARD.encode(&result.audio_data),
        mime_type: result.content_type,
        file_name: result.file_name,
        duration_ms: result.duration_ms,
        chunk_count: result.chunk_count,
        engine: result.engine,
        elapsed_secs: result.elapsed_secs,
    })))
}

// ============================================================================
// Preview Voice
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PreviewVoiceRequest {
    #[serde(alias = "voiceName")]
    pub voice_name: String,
    pub engine: EngineKind,
    #[serde(default, alias = "speakingRate")]
    pub speaking_rate: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct PreviewVoiceResponseDto {
    pub audio_data: String,
    pub mime_type: String,
    pub duration_ms: u64,
}

pub async fn preview_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewVoiceRequest>,
) -> Result<Json<ApiResponse<PreviewVoiceResponseDto>>, ApiError> {
    let cmd = PreviewVoiceCommand {
        voice_name: req.voice_name,
        engine: req.engine,
        speaking_rate: req.speaking_rate,
    };

    let result = state.preview_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(PreviewVoiceResponseDto {
        audio_data: STANDARD.encode(&result.audio_data),
        mime_type: result.content_type,
        duration_ms: result.duration_ms,
    })))
}

// ============================================================================
// Estimate Duration
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EstimateDurationRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "characterCount")]
    pub character_count: Option<usize>,
    pub engine: EngineKind,
}

#[derive(Debug, Serialize)]
pub struct EstimateDurationResponseDto {
    #[serde(flatten)]
    pub estimate: ProgressEstimate,
    pub engine_available: bool,
}

pub async fn estimate_duration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateDurationRequest>,
) -> Result<Json<ApiResponse<EstimateDurationResponseDto>>, ApiError> {
    let query = EstimateDurationQuery {
        text: req.text,
        character_count: req.character_count,
        engine: req.engine,
    };

    let result = state.estimate_handler.handle(query)?;

    Ok(Json(ApiResponse::success(EstimateDurationResponseDto {
        estimate: result.estimate,
        engine_available: result.engine_available,
    })))
}
