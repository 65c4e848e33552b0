//! Fake TTS Client - 本地开发用的离线引擎
//!
//! 不调用任何外部服务，按文本长度生成一段确定性的正弦音

use async_trait::async_trait;
use std::f64::consts::PI;
use std::time::Duration;

use crate::application::ports::{SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest};
use crate::domain::audio::pcm::write_sample;
use crate::domain::synthesis::EngineKind;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    pub kind: EngineKind,
    /// 每个字符生成的音频时长（毫秒）
    pub ms_per_char: u64,
    /// 模拟的请求延迟
    pub latency: Duration,
    pub tone_hz: f64,
}

impl FakeTtsClientConfig {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            ms_per_char: 60,
            latency: Duration::from_millis(200),
            tone_hz: 220.0,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            engine = %config.kind,
            ms_per_char = config.ms_per_char,
            latency_ms = config.latency.as_millis() as u64,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    fn render(&self, request: &SpeechRequest) -> Vec<u8> {
        let sample_rate = request.format.sample_rate as u64;
        let rate = request.speaking_rate.map(|r| r.value() as f64).unwrap_or(1.0);
        let duration_ms =
            (request.text.chars().count() as u64 * self.config.ms_per_char) as f64 / rate;
        let samples = ((duration_ms * sample_rate as f64 / 1000.0) as usize).max(1);

        let mut pcm = vec![0u8; samples * 2];
        for i in 0..samples {
            let t = i as f64 / sample_rate as f64;
            let value = (2.0 * PI * self.config.tone_hz * t).sin() * 0.2 * i16::MAX as f64;
            write_sample(&mut pcm, i * 2, value as i16);
        }
        pcm
    }
}

#[async_trait]
impl SpeechEnginePort for FakeTtsClient {
    fn kind(&self) -> EngineKind {
        self.config.kind
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        tracing::debug!(
            engine = %self.config.kind,
            text_len = request.text.len(),
            voice = %request.voice_id,
            "FakeTtsClient: rendering tone"
        );

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        Ok(SpeechAudio {
            pcm: self.render(&request),
            format: request.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::PcmFormat;
    use crate::domain::synthesis::{SpeakingRate, VoiceId};

    fn request(text: &str, rate: Option<f32>) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            voice_id: VoiceId::new("Kore").unwrap(),
            speaking_rate: rate.map(|r| SpeakingRate::new(r).unwrap()),
            format: PcmFormat::default(),
        }
    }

    #[tokio::test]
    async fn test_duration_follows_text_length() {
        let client = FakeTtsClient::new(
            FakeTtsClientConfig::new(EngineKind::Fast).with_latency(Duration::ZERO),
        );
        let audio = client.synthesize(request(&"a".repeat(50), None)).await.unwrap();
        // 50 * 60ms = 3s @ 24kHz
        assert_eq!(audio.pcm.len(), 3 * 24_000 * 2);
        assert_eq!(audio.format, PcmFormat::default());
    }

    #[tokio::test]
    async fn test_faster_rate_gives_shorter_audio() {
        let client = FakeTtsClient::new(
            FakeTtsClientConfig::new(EngineKind::Fast).with_latency(Duration::ZERO),
        );
        let normal = client.synthesize(request("hello world", None)).await.unwrap();
        let fast = client.synthesize(request("hello world", Some(2.0))).await.unwrap();
        assert!(fast.pcm.len() < normal.pcm.len());
    }

    #[tokio::test]
    async fn test_empty_text_still_returns_a_frame() {
        let client = FakeTtsClient::new(
            FakeTtsClientConfig::new(EngineKind::Premium).with_latency(Duration::ZERO),
        );
        let audio = client.synthesize(request("", None)).await.unwrap();
        assert_eq!(audio.pcm.len(), 2);
    }
}
