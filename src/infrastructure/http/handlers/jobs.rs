//! Job Handlers - 后台合成任务

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    CancelSynthesisJobCommand, GetJobAudioQuery, GetJobStatusQuery, JobState, JobStatusView,
    SubmitSynthesisJobCommand,
};
use crate::domain::audio::ProgressSnapshot;
use crate::domain::synthesis::EngineKind;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Submit Job
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub text: String,
    #[serde(alias = "voiceName")]
    pub voice_name: String,
    pub engine: EngineKind,
    #[serde(default, alias = "speakingRate")]
    pub speaking_rate: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SubmitJobResponseDto {
    pub job_id: String,
    pub chunk_count: usize,
    pub estimated_total_secs: u64,
}

pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitJobRequest>,
) -> Result<Json<ApiResponse<SubmitJobResponseDto>>, ApiError> {
    let cmd = SubmitSynthesisJobCommand {
        text: req.text,
        voice_name: req.voice_name,
        engine: req.engine,
        speaking_rate: req.speaking_rate,
    };

    let result = state.submit_job_handler.handle(cmd)?;

    Ok(Json(ApiResponse::success(SubmitJobResponseDto {
        job_id: result.job_id,
        chunk_count: result.estimate.chunk_count,
        estimated_total_secs: result.estimate.total_secs(),
    })))
}

// ============================================================================
// Job Status
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JobIdRequest {
    #[serde(alias = "jobId")]
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct JobStatusDto {
    pub job_id: String,
    pub state: JobState,
    pub engine: EngineKind,
    pub voice_name: String,
    pub character_count: usize,
    pub chunk_count: usize,
    pub estimated_total_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub audio_ready: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<JobStatusView> for JobStatusDto {
    fn from(view: JobStatusView) -> Self {
        Self {
            job_id: view.job_id,
            state: view.state,
            engine: view.engine,
            voice_name: view.voice_name,
            character_count: view.character_count,
            chunk_count: view.chunk_count,
            estimated_total_secs: view.estimated_total_secs,
            progress: view.progress,
            error: view.error,
            audio_ready: view.audio_ready,
            created_at: view.created_at,
            completed_at: view.completed_at,
        }
    }
}

pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<JobStatusDto>>, ApiError> {
    let view = state
        .job_status_handler
        .handle(GetJobStatusQuery { job_id: req.job_id })?;

    Ok(Json(ApiResponse::success(view.into())))
}

// ============================================================================
// Cancel Job
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CancelJobResponseDto {
    pub job_id: String,
    pub state: JobState,
}

pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<CancelJobResponseDto>>, ApiError> {
    let result = state
        .cancel_job_handler
        .handle(CancelSynthesisJobCommand { job_id: req.job_id })?;

    Ok(Json(ApiResponse::success(CancelJobResponseDto {
        job_id: result.job_id,
        state: result.state,
    })))
}

// ============================================================================
// Job Audio
// ============================================================================

/// 下载已完成任务的 WAV 附件
pub async fn job_audio(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state.job_audio_handler.handle(GetJobAudioQuery { job_id })?;
    let audio_data = Arc::unwrap_or_clone(result.audio_data);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, audio_data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.file_name),
        )
        .body(Body::from(audio_data))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
