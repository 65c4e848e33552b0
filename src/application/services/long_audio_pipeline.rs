//! 长音频合成流水线
//!
//! 分块 -> 逐块合成（带重试）-> 增量拼接 -> 返回单条 PCM。
//! 块严格按顺序串行合成，任何一块失败即终止并丢弃已合成部分。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::application::error::SynthesisError;
use crate::application::ports::{ProgressSinkPort, SynthesisEvent};
use crate::domain::audio::{PcmFormat, ProgressEstimate, StitchMode, StitchedAudio};
use crate::domain::chunk_text;
use crate::domain::synthesis::{EngineKind, SpeakingRate, VoiceId};

use super::{EngineRegistry, ProgressTracker};

/// 已校验的合成请求
#[derive(Debug, Clone)]
pub struct LongAudioRequest {
    pub text: String,
    pub voice_id: VoiceId,
    pub engine: EngineKind,
    pub speaking_rate: SpeakingRate,
}

impl LongAudioRequest {
    pub fn character_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub pcm: Vec<u8>,
    pub format: PcmFormat,
    pub engine: EngineKind,
    pub chunk_count: usize,
    pub character_count: usize,
    pub duration_ms: u64,
    pub elapsed_secs: u64,
}

pub struct LongAudioPipeline {
    engines: Arc<EngineRegistry>,
    job_timeout: Duration,
}

impl LongAudioPipeline {
    pub fn new(engines: Arc<EngineRegistry>, job_timeout: Duration) -> Self {
        Self {
            engines,
            job_timeout,
        }
    }

    pub fn engines(&self) -> &Arc<EngineRegistry> {
        &self.engines
    }

    /// 估算耗时（引擎未启用也可以估算）
    pub fn estimate(&self, character_count: usize, engine: EngineKind) -> ProgressEstimate {
        ProgressEstimate::new(character_count, &self.engines.profile(engine))
    }

    /// 执行合成
    ///
    /// 失败、取消、超时都会发布对应的终止事件。
    /// `job_timeout` 是整个请求的传输上限，与单次请求超时无关。
    pub async fn run(
        &self,
        request: &LongAudioRequest,
        sink: Arc<dyn ProgressSinkPort>,
        cancel: CancellationToken,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        let current_chunk = AtomicUsize::new(0);
        let result = match tokio::time::timeout(
            self.job_timeout,
            self.run_chunks(request, sink.clone(), &cancel, &current_chunk),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SynthesisError::TransportTimeout {
                chunk_index: current_chunk.load(Ordering::Relaxed),
                limit_secs: self.job_timeout.as_secs(),
            }),
        };

        match &result {
            Ok(audio) => {
                sink.publish(SynthesisEvent::Completed {
                    chunk_count: audio.chunk_count,
                    byte_length: audio.pcm.len(),
                    duration_ms: audio.duration_ms,
                    elapsed_secs: audio.elapsed_secs,
                });
            }
            Err(SynthesisError::Cancelled { next_chunk }) => {
                warn!(engine = %request.engine, next_chunk, "Synthesis cancelled");
                sink.publish(SynthesisEvent::Cancelled {
                    next_chunk: *next_chunk,
                });
            }
            Err(e) => {
                error!(engine = %request.engine, error = %e, "Synthesis failed");
                sink.publish(SynthesisEvent::Failed {
                    error: e.to_string(),
                    chunk_index: e.chunk_index(),
                });
            }
        }

        result
    }

    async fn run_chunks(
        &self,
        request: &LongAudioRequest,
        sink: Arc<dyn ProgressSinkPort>,
        cancel: &CancellationToken,
        current_chunk: &AtomicUsize,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        // 引擎缺失在任何块开始前报告
        let adapter = self.engines.adapter(request.engine)?;
        let profile = adapter.profile().clone();
        let format = adapter.format();

        let chunks = chunk_text(&request.text, profile.chunk_size)?;
        let chunk_count = chunks.len();
        let character_count = request.character_count();
        let estimate = ProgressEstimate::new(character_count, &profile);

        info!(
            engine = %profile.kind,
            voice = %request.voice_id,
            character_count,
            chunk_count,
            estimated_secs = estimate.total_secs(),
            "Starting long audio synthesis"
        );
        sink.publish(SynthesisEvent::Started {
            engine: profile.kind,
            character_count,
            chunk_count,
            estimated_total_secs: estimate.total_secs(),
        });

        let mut stitched = StitchedAudio::new(StitchMode::for_profile(&profile))?;
        let tracker = ProgressTracker::start(estimate, chunk_count, sink, cancel);

        for chunk in &chunks {
            current_chunk.store(chunk.index, Ordering::Relaxed);
            if cancel.is_cancelled() {
                return Err(SynthesisError::Cancelled {
                    next_chunk: chunk.index,
                });
            }

            let pcm = adapter
                .synthesize(
                    chunk.index,
                    &chunk.content,
                    &request.voice_id,
                    request.speaking_rate,
                    cancel,
                )
                .await?;
            let bytes = pcm.len();
            stitched.append(pcm)?;
            tracker.chunk_completed(chunk.index, bytes);

            let is_last = chunk.index + 1 == chunk_count;
            if !is_last && !profile.inter_chunk_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(SynthesisError::Cancelled {
                            next_chunk: chunk.index + 1,
                        });
                    }
                    _ = tokio::time::sleep(profile.inter_chunk_delay) => {}
                }
            }
        }

        let progress = tracker.finish();
        let pcm = stitched.into_pcm();
        let duration_ms = format.duration_ms(pcm.len());

        info!(
            engine = %profile.kind,
            chunk_count,
            bytes = pcm.len(),
            duration_ms,
            elapsed_secs = progress.elapsed_secs,
            "Long audio synthesis completed"
        );

        Ok(SynthesizedAudio {
            pcm,
            format,
            engine: profile.kind,
            chunk_count,
            character_count,
            duration_ms,
            elapsed_secs: progress.elapsed_secs,
        })
    }
}
