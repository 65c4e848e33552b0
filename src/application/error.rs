//! 应用层错误定义
//!
//! - SynthesisError: 长音频流水线的失败原因，携带块序号和尝试次数
//! - ApplicationError: 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{EncodeError, JobError, SpeechError};
use crate::domain::audio::AudioError;
use crate::domain::synthesis::{EngineKind, SynthesisDomainError};

/// 合成流水线错误
///
/// 任何一块失败都会终止整个请求，已合成的音频全部丢弃。
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// 单块在重试预算内始终失败
    #[error("Chunk {chunk_index} failed after {attempts} attempt(s): {cause}")]
    ChunkSynthesis {
        chunk_index: usize,
        attempts: u32,
        #[source]
        cause: SpeechError,
    },

    /// 整个请求超过任务时限（小时级），不重试
    #[error("Synthesis exceeded the {limit_secs}s job limit during chunk {chunk_index}")]
    TransportTimeout { chunk_index: usize, limit_secs: u64 },

    /// 引擎缺少凭据或未启用，在任何块开始前报告
    #[error("Engine '{engine}' is not configured: {reason}")]
    Configuration { engine: EngineKind, reason: String },

    #[error("Synthesis cancelled before chunk {next_chunk}")]
    Cancelled { next_chunk: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stitch error: {0}")]
    Stitch(#[from] AudioError),
}

impl SynthesisError {
    /// 失败发生在哪个块（如果能确定）
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            SynthesisError::ChunkSynthesis { chunk_index, .. }
            | SynthesisError::TransportTimeout { chunk_index, .. } => Some(*chunk_index),
            SynthesisError::Cancelled { next_chunk } => Some(*next_chunk),
            _ => None,
        }
    }
}

impl From<SynthesisDomainError> for SynthesisError {
    fn from(err: SynthesisDomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 合成失败
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// 暂时无法受理（任务队列已满等）
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// 容器封装失败
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SynthesisDomainError> for ApplicationError {
    fn from(err: SynthesisDomainError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<EncodeError> for ApplicationError {
    fn from(err: EncodeError) -> Self {
        Self::EncodingError(err.to_string())
    }
}

impl From<JobError> for ApplicationError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => Self::not_found("Job", id),
            JobError::InvalidStateTransition(msg) => Self::InvalidState(msg),
            e @ (JobError::QueueFull | JobError::QueueClosed) => {
                Self::ServiceUnavailable(e.to_string())
            }
            other => Self::InternalError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_error_message_names_chunk_and_attempts() {
        let err = SynthesisError::ChunkSynthesis {
            chunk_index: 2,
            attempts: 5,
            cause: SpeechError::ServiceError {
                status: 503,
                message: "overloaded".into(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("Chunk 2"));
        assert!(message.contains("5 attempt"));
        assert_eq!(err.chunk_index(), Some(2));
    }

    #[test]
    fn test_job_not_found_maps_to_not_found() {
        let err: ApplicationError = JobError::NotFound("abc".into()).into();
        assert!(matches!(err, ApplicationError::NotFound { id, .. } if id == "abc"));
    }
}
