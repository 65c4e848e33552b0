//! Job Commands - 后台合成任务

use crate::application::ports::JobState;
use crate::domain::audio::ProgressEstimate;
use crate::domain::synthesis::EngineKind;

/// 提交后台合成任务命令
#[derive(Debug, Clone)]
pub struct SubmitSynthesisJobCommand {
    pub text: String,
    pub voice_name: String,
    pub engine: EngineKind,
    pub speaking_rate: Option<f32>,
}

/// 提交任务响应
#[derive(Debug, Clone)]
pub struct SubmitSynthesisJobResponse {
    pub job_id: String,
    pub estimate: ProgressEstimate,
}

/// 取消任务命令
#[derive(Debug, Clone)]
pub struct CancelSynthesisJobCommand {
    pub job_id: String,
}

/// 取消任务响应
#[derive(Debug, Clone)]
pub struct CancelSynthesisJobResponse {
    pub job_id: String,
    /// 取消请求发出后的状态；已结束的任务保持原状态
    pub state: JobState,
}
