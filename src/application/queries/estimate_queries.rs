//! Estimate Queries - 合成耗时估算

use crate::domain::audio::ProgressEstimate;
use crate::domain::synthesis::EngineKind;

/// 估算查询：给出文本或直接给出字符数
#[derive(Debug, Clone)]
pub struct EstimateDurationQuery {
    pub text: Option<String>,
    pub character_count: Option<usize>,
    pub engine: EngineKind,
}

/// 估算响应
#[derive(Debug, Clone)]
pub struct EstimateDurationResponse {
    pub estimate: ProgressEstimate,
    /// 引擎当前是否已配置
    pub engine_available: bool,
}
