//! Synthesis Context - 引擎能力描述
//!
//! 两个引擎差异全部收敛为一份 [`EngineProfile`] 配置数据，
//! 由同一条合成流水线消费。

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::SynthesisDomainError;

/// 合成引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// 高品质音色引擎：原生 PCM，无语速参数，配额严格
    #[serde(alias = "gemini")]
    Premium,
    /// 快速云引擎：16-bit PCM @ 24kHz，支持原生语速，限流宽松
    #[serde(alias = "google-cloud")]
    Fast,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Premium => "premium",
            EngineKind::Fast => "fast",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EngineKind {
    type Err = SynthesisDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "premium" | "gemini" => Ok(EngineKind::Premium),
            "fast" | "google-cloud" => Ok(EngineKind::Fast),
            other => Err(SynthesisDomainError::UnknownEngine(other.to_string())),
        }
    }
}

/// 引擎能力描述
///
/// 分块大小、重试节奏、块间延迟、是否支持语速、是否需要交叉淡化，
/// 以及进度估算用的经验常数。
#[derive(Debug, Clone, PartialEq)]
pub struct EngineProfile {
    pub kind: EngineKind,
    /// 单次请求的最大字符数
    pub chunk_size: usize,
    /// 单块最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 首次重试前的等待，之后每次翻倍
    pub base_delay: Duration,
    /// 两个成功块之间的固定间隔
    pub inter_chunk_delay: Duration,
    pub supports_speaking_rate: bool,
    pub needs_crossfade: bool,
    /// 单块平均生成耗时（秒，经验值）
    pub seconds_per_chunk: f64,
    /// 块间平均额外耗时（秒，含重试摊销）
    pub estimated_inter_chunk_secs: f64,
}

impl EngineProfile {
    pub fn premium() -> Self {
        Self {
            kind: EngineKind::Premium,
            chunk_size: 3000,
            max_attempts: 5,
            base_delay: Duration::from_millis(3000),
            inter_chunk_delay: Duration::from_millis(2000),
            supports_speaking_rate: false,
            needs_crossfade: false,
            seconds_per_chunk: 20.0,
            estimated_inter_chunk_secs: 9.0,
        }
    }

    pub fn fast() -> Self {
        Self {
            kind: EngineKind::Fast,
            chunk_size: 4000,
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            inter_chunk_delay: Duration::from_millis(500),
            supports_speaking_rate: true,
            needs_crossfade: true,
            seconds_per_chunk: 5.0,
            estimated_inter_chunk_secs: 0.5,
        }
    }

    pub fn for_kind(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Premium => Self::premium(),
            EngineKind::Fast => Self::fast(),
        }
    }
}
