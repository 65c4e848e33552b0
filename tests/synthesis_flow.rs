//! 端到端合成流程：分块、重试、拼接、WAV 封装

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use storyvoice::application::{
    AudioEncoderPort, EngineRegistry, LongAudioPipeline, LongAudioRequest, NoopProgressSink,
    SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest, SynthesisError,
};
use storyvoice::domain::audio::{PcmFormat, CROSSFADE_BYTES};
use storyvoice::domain::synthesis::{EngineKind, EngineProfile, SpeakingRate, VoiceId};
use storyvoice::infrastructure::adapters::{WavEncoder, WAV_HEADER_LEN};

/// 每次返回固定长度静音的引擎，可设置前若干次失败
struct SilenceEngine {
    kind: EngineKind,
    bytes: usize,
    failures: usize,
    calls: AtomicUsize,
}

impl SilenceEngine {
    fn new(kind: EngineKind, bytes: usize) -> Arc<Self> {
        Self::failing(kind, bytes, 0)
    }

    fn failing(kind: EngineKind, bytes: usize, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            kind,
            bytes,
            failures,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEnginePort for SilenceEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(SpeechError::ServiceError {
                status: 503,
                message: "model overloaded".into(),
            });
        }
        Ok(SpeechAudio {
            pcm: vec![0u8; self.bytes],
            format: request.format,
        })
    }
}

fn request(engine: EngineKind, chars: usize) -> LongAudioRequest {
    LongAudioRequest {
        text: "a".repeat(chars),
        voice_id: VoiceId::new("Kore").unwrap(),
        engine,
        speaking_rate: SpeakingRate::default(),
    }
}

fn pipeline(engine: Arc<SilenceEngine>, profile: EngineProfile) -> LongAudioPipeline {
    let registry = EngineRegistry::new().with_engine(engine, profile);
    LongAudioPipeline::new(Arc::new(registry), Duration::from_secs(7200))
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[tokio::test(start_paused = true)]
async fn fast_story_is_crossfaded_into_one_wav() {
    let engine = SilenceEngine::new(EngineKind::Fast, 96_000);
    let pipeline = pipeline(engine.clone(), EngineProfile::fast());

    let audio = pipeline
        .run(
            &request(EngineKind::Fast, 9500),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(engine.calls(), 3);
    assert_eq!(audio.chunk_count, 3);

    let expected_pcm = 3 * 96_000 - 2 * CROSSFADE_BYTES;
    let wav = WavEncoder::new().encode(&audio.pcm, audio.format).unwrap();
    assert_eq!(wav.len(), WAV_HEADER_LEN + expected_pcm);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(u32_at(&wav, 4) as usize, 36 + expected_pcm);
    assert_eq!(u32_at(&wav, 40) as usize, expected_pcm);
    assert_eq!(u32_at(&wav, 24), 24_000);
}

#[tokio::test(start_paused = true)]
async fn premium_story_is_concatenated() {
    let engine = SilenceEngine::new(EngineKind::Premium, 48_000);
    let pipeline = pipeline(engine.clone(), EngineProfile::premium());

    let audio = pipeline
        .run(
            &request(EngineKind::Premium, 6500),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(audio.chunk_count, 3);
    assert_eq!(audio.pcm.len(), 3 * 48_000);
    assert_eq!(audio.duration_ms, 3000);
}

#[tokio::test(start_paused = true)]
async fn empty_story_yields_header_only_wav() {
    let engine = SilenceEngine::new(EngineKind::Fast, 96_000);
    let pipeline = pipeline(engine.clone(), EngineProfile::fast());

    let audio = pipeline
        .run(
            &request(EngineKind::Fast, 0),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(engine.calls(), 0);
    let wav = WavEncoder::new()
        .encode(&audio.pcm, PcmFormat::default())
        .unwrap();
    assert_eq!(wav.len(), WAV_HEADER_LEN);
    assert_eq!(u32_at(&wav, 40), 0);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_backoff() {
    let engine = SilenceEngine::failing(EngineKind::Premium, 4800, 2);
    let pipeline = pipeline(engine.clone(), EngineProfile::premium());

    let started = tokio::time::Instant::now();
    let audio = pipeline
        .run(
            &request(EngineKind::Premium, 100),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(engine.calls(), 3);
    assert_eq!(audio.pcm.len(), 4800);
    // 3s + 6s 两次退避
    assert_eq!(started.elapsed(), Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_abort_the_whole_story() {
    let engine = SilenceEngine::failing(EngineKind::Premium, 4800, usize::MAX);
    let pipeline = pipeline(engine.clone(), EngineProfile::premium());

    let err = pipeline
        .run(
            &request(EngineKind::Premium, 6500),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(engine.calls(), 5);
    match err {
        SynthesisError::ChunkSynthesis {
            chunk_index,
            attempts,
            cause,
        } => {
            assert_eq!(chunk_index, 0);
            assert_eq!(attempts, 5);
            assert!(matches!(cause, SpeechError::ServiceError { status: 503, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unconfigured_engine_fails_before_any_chunk() {
    let engine = SilenceEngine::new(EngineKind::Fast, 96_000);
    let pipeline = pipeline(engine.clone(), EngineProfile::fast());

    let err = pipeline
        .run(
            &request(EngineKind::Premium, 100),
            Arc::new(NoopProgressSink),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::Configuration {
            engine: EngineKind::Premium,
            ..
        }
    ));
    assert_eq!(engine.calls(), 0);
}
