//! Job Manager Port - 后台合成任务管理
//!
//! 长文本合成可能持续数十分钟，提交后由后台 worker 执行，
//! 客户端通过任务 ID 轮询状态或订阅 WebSocket。具体实现在 infrastructure/memory 层

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::services::LongAudioRequest;
use crate::domain::audio::{ProgressEstimate, ProgressSnapshot};

/// Job Manager 错误
#[derive(Debug, Error, PartialEq)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Job queue is full")]
    QueueFull,

    #[error("Job queue is closed")]
    QueueClosed,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 排队中
    Pending,
    /// 正在合成
    Synthesizing,
    /// 合成完成，音频可下载
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Synthesizing => "synthesizing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

/// 后台合成任务
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    pub job_id: String,
    pub request: Arc<LongAudioRequest>,
    pub estimate: ProgressEstimate,
    pub state: JobState,
    pub progress: Option<ProgressSnapshot>,
    /// 完成后的 WAV 数据
    pub audio: Option<Arc<Vec<u8>>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// 取消令牌，worker 与 cancel 接口共享
    pub cancel: CancellationToken,
}

impl SynthesisJob {
    pub fn new(request: LongAudioRequest, estimate: ProgressEstimate) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            request: Arc::new(request),
            estimate,
            state: JobState::Pending,
            progress: None,
            audio: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Job Manager Port
///
/// 所有任务状态保存在内存中
pub trait JobManagerPort: Send + Sync {
    /// 提交任务到队列，返回任务 ID
    fn submit(&self, job: SynthesisJob) -> Result<String, JobError>;

    /// 获取任务快照
    fn get_job(&self, job_id: &str) -> Option<SynthesisJob>;

    /// 设置任务状态
    fn set_state(&self, job_id: &str, state: JobState) -> Result<(), JobError>;

    /// 记录最新进度
    fn update_progress(&self, job_id: &str, progress: ProgressSnapshot);

    /// 标记完成并保存音频
    fn set_completed(&self, job_id: &str, audio: Vec<u8>) -> Result<(), JobError>;

    /// 标记失败并记录错误
    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError>;

    /// 请求取消；已结束的任务原样返回其状态
    fn cancel(&self, job_id: &str) -> Result<JobState, JobError>;

    /// 清理结束超过 `retention` 的任务，返回被清理的任务 ID
    fn purge_finished(&self, retention: chrono::Duration) -> Vec<String>;
}
