//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、AudioEncoder、JobManager、ProgressSink）
//! - services: 长音频合成流水线（引擎适配、重试、进度、拼接）
//! - retry: 指数退避重试
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod retry;
pub mod services;

// Re-exports
pub use commands::{
    audio_file_name,
    // Synthesis commands
    PreviewVoiceCommand,
    PreviewVoiceResponse,
    SynthesizeLongAudioCommand,
    SynthesizeLongAudioResponse,
    // Job commands
    CancelSynthesisJobCommand,
    CancelSynthesisJobResponse,
    SubmitSynthesisJobCommand,
    SubmitSynthesisJobResponse,
    // Handlers
    handlers::{
        CancelSynthesisJobHandler, PreviewVoiceHandler, SubmitSynthesisJobHandler,
        SynthesizeLongAudioHandler,
    },
};

pub use error::{ApplicationError, SynthesisError};

pub use ports::{
    // Audio encoder
    AudioEncoderPort,
    AudioInfo,
    EncodeError,
    // Job manager
    JobError,
    JobManagerPort,
    JobState,
    SynthesisJob,
    // Progress sink
    NoopProgressSink,
    ProgressSinkPort,
    SynthesisEvent,
    // Speech engine
    SpeechAudio,
    SpeechEnginePort,
    SpeechError,
    SpeechRequest,
};

pub use queries::{
    // Estimate queries
    EstimateDurationQuery,
    EstimateDurationResponse,
    // Job queries
    GetJobAudioQuery,
    GetJobAudioResponse,
    GetJobStatusQuery,
    JobStatusView,
    // Handlers
    handlers::{EstimateDurationHandler, GetJobAudioHandler, GetJobStatusHandler},
};

pub use retry::{retry_with_backoff, RetryFailure, RetryOutcome, RetryPolicy};
pub use services::{
    EngineAdapter, EngineRegistry, LongAudioPipeline, LongAudioRequest, ProgressTracker,
    SynthesizedAudio,
};
