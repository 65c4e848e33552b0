//! StoryVoice - 长篇故事语音合成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 文本分块、引擎能力描述、PCM 拼接、进度估算
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, AudioEncoder, JobManager, ProgressSink）
//! - Services: 引擎适配（重试）、长音频流水线、进度心跳
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: Gemini / Cloud TTS / Fake 引擎客户端，WAV 封装
//! - HTTP: RESTful API + WebSocket
//! - Memory: JobManager 内存实现
//! - Worker: SynthesisWorker 后台任务处理
//! - Events: 任务事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
