//! Job Queries - 后台任务状态与音频

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::JobState;
use crate::domain::audio::ProgressSnapshot;
use crate::domain::synthesis::EngineKind;

/// 查询任务状态
#[derive(Debug, Clone)]
pub struct GetJobStatusQuery {
    pub job_id: String,
}

/// 任务状态视图
#[derive(Debug, Clone)]
pub struct JobStatusView {
    pub job_id: String,
    pub state: JobState,
    pub engine: EngineKind,
    pub voice_name: String,
    pub character_count: usize,
    pub chunk_count: usize,
    pub estimated_total_secs: u64,
    pub progress: Option<ProgressSnapshot>,
    pub error: Option<String>,
    pub audio_ready: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 获取任务音频
#[derive(Debug, Clone)]
pub struct GetJobAudioQuery {
    pub job_id: String,
}

/// 任务音频响应
#[derive(Debug, Clone)]
pub struct GetJobAudioResponse {
    pub audio_data: Arc<Vec<u8>>,
    pub content_type: String,
    pub file_name: String,
}
