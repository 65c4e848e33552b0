//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::domain::synthesis::{EngineKind, EngineProfile};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 高品质引擎
    #[serde(default)]
    pub premium: PremiumEngineConfig,

    /// 快速引擎
    #[serde(default)]
    pub fast: FastEngineConfig,

    /// 合成与任务配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 引擎节奏配置，缺省值与内置能力描述一致
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    /// 单次请求的最大字符数
    pub chunk_size: usize,
    /// 单块最大尝试次数（含首次）
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub inter_chunk_delay_ms: u64,
}

impl PacingConfig {
    fn builtin(kind: EngineKind) -> Self {
        let profile = EngineProfile::for_kind(kind);
        Self {
            chunk_size: profile.chunk_size,
            max_attempts: profile.max_attempts,
            base_delay_ms: profile.base_delay.as_millis() as u64,
            inter_chunk_delay_ms: profile.inter_chunk_delay.as_millis() as u64,
        }
    }

    /// 在内置能力描述上应用节奏配置
    pub fn apply(&self, kind: EngineKind) -> EngineProfile {
        EngineProfile {
            chunk_size: self.chunk_size,
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            inter_chunk_delay: Duration::from_millis(self.inter_chunk_delay_ms),
            ..EngineProfile::for_kind(kind)
        }
    }
}

/// 高品质引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct PremiumEngineConfig {
    /// 缺省时引擎不可用
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_premium_base_url")]
    pub base_url: String,

    #[serde(default = "default_premium_model")]
    pub model: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_premium_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_premium_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_premium_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_premium_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_premium_inter_chunk_delay")]
    pub inter_chunk_delay_ms: u64,
}

fn default_premium_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_premium_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_premium_timeout() -> u64 {
    600
}

fn default_premium_chunk_size() -> usize {
    PacingConfig::builtin(EngineKind::Premium).chunk_size
}

fn default_premium_max_attempts() -> u32 {
    PacingConfig::builtin(EngineKind::Premium).max_attempts
}

fn default_premium_base_delay() -> u64 {
    PacingConfig::builtin(EngineKind::Premium).base_delay_ms
}

fn default_premium_inter_chunk_delay() -> u64 {
    PacingConfig::builtin(EngineKind::Premium).inter_chunk_delay_ms
}

impl Default for PremiumEngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_premium_base_url(),
            model: default_premium_model(),
            request_timeout_secs: default_premium_timeout(),
            chunk_size: default_premium_chunk_size(),
            max_attempts: default_premium_max_attempts(),
            base_delay_ms: default_premium_base_delay(),
            inter_chunk_delay_ms: default_premium_inter_chunk_delay(),
        }
    }
}

impl PremiumEngineConfig {
    pub fn pacing(&self) -> PacingConfig {
        PacingConfig {
            chunk_size: self.chunk_size,
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            inter_chunk_delay_ms: self.inter_chunk_delay_ms,
        }
    }

    pub fn engine_profile(&self) -> EngineProfile {
        self.pacing().apply(EngineKind::Premium)
    }

    /// 非空的 API Key
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

/// 快速引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct FastEngineConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_fast_base_url")]
    pub base_url: String,

    /// 音色名不带语言前缀时使用
    #[serde(default = "default_language_code")]
    pub default_language_code: String,

    #[serde(default = "default_fast_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_fast_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_fast_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_fast_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_fast_inter_chunk_delay")]
    pub inter_chunk_delay_ms: u64,
}

fn default_fast_base_url() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_fast_timeout() -> u64 {
    120
}

fn default_fast_chunk_size() -> usize {
    PacingConfig::builtin(EngineKind::Fast).chunk_size
}

fn default_fast_max_attempts() -> u32 {
    PacingConfig::builtin(EngineKind::Fast).max_attempts
}

fn default_fast_base_delay() -> u64 {
    PacingConfig::builtin(EngineKind::Fast).base_delay_ms
}

fn default_fast_inter_chunk_delay() -> u64 {
    PacingConfig::builtin(EngineKind::Fast).inter_chunk_delay_ms
}

impl Default for FastEngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_fast_base_url(),
            default_language_code: default_language_code(),
            request_timeout_secs: default_fast_timeout(),
            chunk_size: default_fast_chunk_size(),
            max_attempts: default_fast_max_attempts(),
            base_delay_ms: default_fast_base_delay(),
            inter_chunk_delay_ms: default_fast_inter_chunk_delay(),
        }
    }
}

impl FastEngineConfig {
    pub fn pacing(&self) -> PacingConfig {
        PacingConfig {
            chunk_size: self.chunk_size,
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            inter_chunk_delay_ms: self.inter_chunk_delay_ms,
        }
    }

    pub fn engine_profile(&self) -> EngineProfile {
        self.pacing().apply(EngineKind::Fast)
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 合成与后台任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 单次请求的最大字符数
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// 整个任务的时限（秒）
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,

    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// 两个引擎都使用本地假引擎（开发/演示用）
    #[serde(default)]
    pub use_fake_engines: bool,

    /// 已结束任务的保留时长（秒）
    #[serde(default = "default_job_retention")]
    pub job_retention_secs: u64,
}

fn default_max_text_chars() -> usize {
    200_000
}

fn default_job_timeout() -> u64 {
    7200
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_job_retention() -> u64 {
    3600
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            job_timeout_secs: default_job_timeout(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            use_fake_engines: false,
            job_retention_secs: default_job_retention(),
        }
    }
}

impl SynthesisConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否使用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
