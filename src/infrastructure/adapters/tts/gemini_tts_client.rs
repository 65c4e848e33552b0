//! Gemini TTS Client - 高品质音色引擎
//!
//! 实现 SpeechEnginePort，调用 generateContent 接口:
//! POST {base_url}/v1beta/models/{model}:generateContent
//! Request: contents[].parts[].text + generationConfig.speechConfig（音色）
//! Response: candidates[0].content.parts[].inlineData（base64 PCM, audio/L16;rate=24000）
//!
//! 引擎不支持语速参数。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, decode_base64_audio, ensure_success, map_send_error};
use crate::application::ports::{SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest};
use crate::domain::audio::PcmFormat;
use crate::domain::synthesis::EngineKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

/// Gemini TTS 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiTtsClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for GeminiTtsClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            timeout_secs: 600,
        }
    }
}

impl GeminiTtsClientConfig {
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

/// Gemini TTS 客户端
pub struct GeminiTtsClient {
    client: Client,
    config: GeminiTtsClientConfig,
}

impl GeminiTtsClient {
    pub fn new(config: GeminiTtsClientConfig) -> Result<Self, SpeechError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// 从 "audio/L16;codec=pcm;rate=24000" 中取采样率
fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}

fn extract_audio(response: GenerateContentResponse) -> Result<SpeechAudio, SpeechError> {
    let inline = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or_else(|| {
            SpeechError::MalformedAudio("response contained no inline audio data".to_string())
        })?;

    let pcm = decode_base64_audio(&inline.data)?;
    let mut format = PcmFormat::default();
    if let Some(rate) = inline.mime_type.as_deref().and_then(sample_rate_from_mime) {
        format.sample_rate = rate;
    }

    Ok(SpeechAudio { pcm, format })
}

#[async_trait]
impl SpeechEnginePort for GeminiTtsClient {
    fn kind(&self) -> EngineKind {
        EngineKind::Premium
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        if self.config.api_key.is_empty() {
            return Err(SpeechError::NotConfigured("premium engine API key is empty".to_string()));
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: &request.text,
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice_id.as_str(),
                        },
                    },
                },
            },
        };

        tracing::debug!(
            model = %self.config.model,
            voice = %request.voice_id,
            text_len = request.text.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = ensure_success(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::MalformedAudio(format!("invalid response body: {}", e)))?;

        extract_audio(parsed)
    }
}
