//! Cloud TTS Client - 快速云引擎
//!
//! 实现 SpeechEnginePort，调用 text:synthesize 接口:
//! POST {base_url}/v1/text:synthesize
//! Request: {"input": {"text"}, "voice": {"languageCode", "name"},
//!           "audioConfig": {"audioEncoding": "LINEAR16", "sampleRateHertz": 24000, "speakingRate"}}
//! Response: {"audioContent": base64}，LINEAR16 返回带 WAV 头的数据，需剥离

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, decode_base64_audio, ensure_success, map_send_error};
use crate::application::ports::{SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest};
use crate::domain::synthesis::EngineKind;
use crate::infrastructure::adapters::encoder::WavEncoder;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: String,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    sample_rate_hertz: u32,
    speaking_rate: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Cloud TTS 客户端配置
#[derive(Debug, Clone)]
pub struct CloudTtsClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// 音色名里推断不出语言时使用
    pub default_language_code: String,
    pub timeout_secs: u64,
}

impl Default for CloudTtsClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://texttospeech.googleapis.com".to_string(),
            default_language_code: "en-US".to_string(),
            timeout_secs: 120,
        }
    }
}

impl CloudTtsClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Cloud TTS 客户端
pub struct CloudTtsClient {
    client: Client,
    config: CloudTtsClientConfig,
}

impl CloudTtsClient {
    pub fn new(config: CloudTtsClientConfig) -> Result<Self, SpeechError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!(
            "{}/v1/text:synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// "en-US-Neural2-F" -> "en-US"；推断不出时用默认值
    fn language_code_for(&self, voice_name: &str) -> String {
        let mut parts = voice_name.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lang), Some(region), Some(_))
                if (2..=3).contains(&lang.len())
                    && lang.chars().all(|c| c.is_ascii_lowercase())
                    && region.len() == 2
                    && region.chars().all(|c| c.is_ascii_uppercase()) =>
            {
                format!("{}-{}", lang, region)
            }
            _ => self.config.default_language_code.clone(),
        }
    }
}

/// 解码 audioContent，带 WAV 头时剥离
fn extract_audio(content: &str) -> Result<SpeechAudio, SpeechError> {
    if content.is_empty() {
        return Err(SpeechError::MalformedAudio("response contained no audioContent".to_string()));
    }
    let bytes = decode_base64_audio(content)?;

    if WavEncoder::is_wav(&bytes) {
        let (format, pcm) = WavEncoder::split_container(&bytes)
            .map_err(|e| SpeechError::MalformedAudio(e.to_string()))?;
        return Ok(SpeechAudio {
            pcm: pcm.to_vec(),
            format,
        });
    }

    Ok(SpeechAudio {
        pcm: bytes,
        format: Default::default(),
    })
}

#[async_trait]
impl SpeechEnginePort for CloudTtsClient {
    fn kind(&self) -> EngineKind {
        EngineKind::Fast
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        if self.config.api_key.is_empty() {
            return Err(SpeechError::NotConfigured("fast engine API key is empty".to_string()));
        }

        let body = SynthesizeRequest {
            input: SynthesisInput {
                text: &request.text,
            },
            voice: VoiceSelection {
                language_code: self.language_code_for(request.voice_id.as_str()),
                name: request.voice_id.as_str(),
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                sample_rate_hertz: request.format.sample_rate,
                speaking_rate: request.speaking_rate.map(|r| r.value()).unwrap_or(1.0),
            },
        };

        tracing::debug!(
            voice = %request.voice_id,
            language_code = %body.voice.language_code,
            speaking_rate = body.audio_config.speaking_rate,
            text_len = request.text.len(),
            "Sending text:synthesize request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = ensure_success(response).await?;

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::MalformedAudio(format!("invalid response body: {}", e)))?;

        extract_audio(&parsed.audio_content)
    }
}
