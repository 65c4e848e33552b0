//! Synthesis Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SynthesisDomainError;

/// 音色试听使用的固定文本
pub const PREVIEW_TEXT: &str = "Listen to the sound of my voice, and imagine the story I will tell.";

/// 引擎侧的音色标识（如 "Kore"、"en-US-Neural2-F"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, SynthesisDomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(SynthesisDomainError::EmptyVoiceId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语速倍率
///
/// 不变量: 0.5 <= rate <= 2.0，1.0 为正常语速
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeakingRate(f32);

impl SpeakingRate {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;
    pub const NORMAL: SpeakingRate = SpeakingRate(1.0);

    pub fn new(rate: f32) -> Result<Self, SynthesisDomainError> {
        if !rate.is_finite() || !(Self::MIN..=Self::MAX).contains(&rate) {
            return Err(SynthesisDomainError::InvalidSpeakingRate(rate));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_normal(&self) -> bool {
        (self.0 - 1.0).abs() < f32::EPSILON
    }
}

impl Default for SpeakingRate {
    fn default() -> Self {
        Self::NORMAL
    }
}
