//! 引擎适配器
//!
//! 在 [`SpeechEnginePort`] 之上统一叠加：语速能力过滤、返回音频校验、
//! 按引擎能力配置的指数退避重试，以及失败到 [`SynthesisError`] 的映射。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use crate::application::error::SynthesisError;
use crate::application::ports::{SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest};
use crate::application::retry::{retry_with_backoff, RetryFailure, RetryPolicy};
use crate::domain::audio::PcmFormat;
use crate::domain::synthesis::{EngineKind, EngineProfile, SpeakingRate, VoiceId};

pub struct EngineAdapter {
    engine: Arc<dyn SpeechEnginePort>,
    profile: EngineProfile,
    format: PcmFormat,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn SpeechEnginePort>, profile: EngineProfile) -> Self {
        Self {
            engine,
            profile,
            format: PcmFormat::default(),
        }
    }

    pub fn kind(&self) -> EngineKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// 合成一个块，返回经过校验的 PCM
    pub async fn synthesize(
        &self,
        chunk_index: usize,
        text: &str,
        voice_id: &VoiceId,
        speaking_rate: SpeakingRate,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, SynthesisError> {
        let speaking_rate = if self.profile.supports_speaking_rate {
            Some(speaking_rate)
        } else {
            if !speaking_rate.is_normal() {
                tracing::debug!(
                    engine = %self.profile.kind,
                    rate = speaking_rate.value(),
                    "Engine has no native speaking rate, ignoring"
                );
            }
            None
        };

        let request = SpeechRequest {
            text: text.to_string(),
            voice_id: voice_id.clone(),
            speaking_rate,
            format: self.format,
        };
        let policy = RetryPolicy::from_profile(&self.profile);
        let span = tracing::info_span!(
            "chunk",
            engine = %self.profile.kind,
            chunk_index,
            chars = text.chars().count()
        );

        let outcome = retry_with_backoff(
            &policy,
            cancel,
            SpeechError::is_retryable,
            |attempt| {
                let request = request.clone();
                async move {
                    tracing::debug!(attempt, "Calling speech engine");
                    let audio = self.engine.synthesize(request).await?;
                    self.validate(audio)
                }
            },
        )
        .instrument(span)
        .await;

        match outcome.result {
            Ok(pcm) => {
                info!(
                    engine = %self.profile.kind,
                    chunk_index,
                    attempts = outcome.attempts,
                    bytes = pcm.len(),
                    "Chunk synthesized"
                );
                Ok(pcm)
            }
            Err(RetryFailure::Cancelled) => Err(SynthesisError::Cancelled {
                next_chunk: chunk_index,
            }),
            Err(RetryFailure::Fatal(SpeechError::NotConfigured(reason))) => {
                Err(SynthesisError::Configuration {
                    engine: self.profile.kind,
                    reason,
                })
            }
            Err(RetryFailure::Fatal(cause)) | Err(RetryFailure::Exhausted(cause)) => {
                Err(SynthesisError::ChunkSynthesis {
                    chunk_index,
                    attempts: outcome.attempts,
                    cause,
                })
            }
        }
    }

    /// 空数据、格式不符、半个采样都算作畸形音频，计入重试预算
    fn validate(&self, audio: SpeechAudio) -> Result<Vec<u8>, SpeechError> {
        if audio.pcm.is_empty() {
            return Err(SpeechError::MalformedAudio("empty audio payload".to_string()));
        }
        if audio.format != self.format {
            return Err(SpeechError::MalformedAudio(format!(
                "unexpected format {}Hz/{}ch/{}bit",
                audio.format.sample_rate, audio.format.channels, audio.format.bits_per_sample
            )));
        }
        self.format
            .ensure_whole_frames(audio.pcm.len())
            .map_err(|e| SpeechError::MalformedAudio(e.to_string()))?;
        Ok(audio.pcm)
    }
}
