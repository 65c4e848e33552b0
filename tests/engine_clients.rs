//! HTTP 引擎客户端对接本地模拟服务

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use storyvoice::application::{
    AudioEncoderPort, EngineAdapter, SpeechEnginePort, SpeechError, SpeechRequest, SynthesisError,
};
use storyvoice::domain::audio::PcmFormat;
use storyvoice::domain::synthesis::{EngineProfile, SpeakingRate, VoiceId};
use storyvoice::infrastructure::adapters::{
    CloudTtsClient, CloudTtsClientConfig, GeminiTtsClient, GeminiTtsClientConfig, WavEncoder,
};

/// 收到的请求：路径、API Key、JSON 体
#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    /// 前若干次请求返回 503
    failures: Arc<AtomicUsize>,
}

impl Recorded {
    fn record(&self, uri: &Uri, headers: &HeaderMap, body: Value) -> bool {
        let key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests
            .lock()
            .unwrap()
            .push((uri.path().to_string(), key, body));

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return false;
        }
        true
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> (String, Option<String>, Value) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

fn overloaded() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": { "message": "model overloaded" } })),
    )
        .into_response()
}

async fn cloud_tts(
    State(recorded): State<Recorded>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !recorded.record(&uri, &headers, body) {
        return overloaded();
    }
    // LINEAR16 返回带 WAV 头的数据
    let wav = WavEncoder::new()
        .encode(&[1u8; 480], PcmFormat::default())
        .unwrap();
    Json(json!({ "audioContent": STANDARD.encode(wav) })).into_response()
}

async fn gemini(
    State(recorded): State<Recorded>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !recorded.record(&uri, &headers, body) {
        return overloaded();
    }
    Json(json!({
        "candidates": [{
            "content": { "parts": [{
                "inlineData": {
                    "mimeType": "audio/L16;codec=pcm;rate=24000",
                    "data": STANDARD.encode([2u8; 960])
                }
            }]}
        }]
    }))
    .into_response()
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// 接受连接但从不响应
async fn stalled_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });
    (format!("http://{}", addr), accepted)
}

fn speech_request(voice: &str, rate: Option<SpeakingRate>) -> SpeechRequest {
    SpeechRequest {
        text: "Once upon a time.".to_string(),
        voice_id: VoiceId::new(voice).unwrap(),
        speaking_rate: rate,
        format: PcmFormat::default(),
    }
}

/// 真实节奏太慢，测试里缩短退避
fn quick(mut profile: EngineProfile) -> EngineProfile {
    profile.base_delay = Duration::from_millis(10);
    profile.inter_chunk_delay = Duration::ZERO;
    profile
}

#[tokio::test]
async fn cloud_client_sends_linear16_request_and_strips_wav_header() {
    let recorded = Recorded::default();
    let base_url = serve(
        Router::new()
            .fallback(cloud_tts)
            .with_state(recorded.clone()),
    )
    .await;
    let client =
        CloudTtsClient::new(CloudTtsClientConfig::new("fast-key").with_base_url(base_url)).unwrap();

    let audio = client
        .synthesize(speech_request(
            "en-GB-Neural2-B",
            Some(SpeakingRate::new(1.25).unwrap()),
        ))
        .await
        .unwrap();

    assert_eq!(audio.pcm, vec![1u8; 480]);
    assert_eq!(audio.format, PcmFormat::default());

    let (path, key, body) = recorded.last();
    assert_eq!(path, "/v1/text:synthesize");
    assert_eq!(key.as_deref(), Some("fast-key"));
    assert_eq!(body["input"]["text"], "Once upon a time.");
    assert_eq!(body["voice"]["name"], "en-GB-Neural2-B");
    assert_eq!(body["voice"]["languageCode"], "en-GB");
    assert_eq!(body["audioConfig"]["audioEncoding"], "LINEAR16");
    assert_eq!(body["audioConfig"]["sampleRateHertz"], 24_000);
    assert_eq!(body["audioConfig"]["speakingRate"], 1.25);
}

#[tokio::test]
async fn gemini_client_requests_audio_modality_and_decodes_inline_pcm() {
    let recorded = Recorded::default();
    let base_url = serve(Router::new().fallback(gemini).with_state(recorded.clone())).await;
    let client =
        GeminiTtsClient::new(GeminiTtsClientConfig::new("premium-key").with_base_url(base_url))
            .unwrap();

    let audio = client.synthesize(speech_request("Kore", None)).await.unwrap();

    assert_eq!(audio.pcm, vec![2u8; 960]);
    assert_eq!(audio.format.sample_rate, 24_000);

    let (path, key, body) = recorded.last();
    assert_eq!(
        path,
        "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
    );
    assert_eq!(key.as_deref(), Some("premium-key"));
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Once upon a time.");
    assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
    assert_eq!(
        body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Kore"
    );
}

#[tokio::test]
async fn service_errors_are_retried_through_the_adapter() {
    let recorded = Recorded::default();
    recorded.failures.store(2, Ordering::SeqCst);
    let base_url = serve(Router::new().fallback(gemini).with_state(recorded.clone())).await;
    let client =
        GeminiTtsClient::new(GeminiTtsClientConfig::new("premium-key").with_base_url(base_url))
            .unwrap();
    let adapter = EngineAdapter::new(Arc::new(client), quick(EngineProfile::premium()));

    let pcm = adapter
        .synthesize(
            0,
            "Once upon a time.",
            &VoiceId::new("Kore").unwrap(),
            SpeakingRate::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(pcm.len(), 960);
    assert_eq!(recorded.count(), 3);
}

#[tokio::test]
async fn unresponsive_engine_is_retried_until_budget_is_spent() {
    let (base_url, accepted) = stalled_server().await;
    let client = CloudTtsClient::new(
        CloudTtsClientConfig::new("fast-key")
            .with_base_url(base_url)
            .with_timeout(1),
    )
    .unwrap();
    let adapter = EngineAdapter::new(Arc::new(client), quick(EngineProfile::fast()));

    let err = adapter
        .synthesize(
            0,
            "Once upon a time.",
            &VoiceId::new("en-US-Neural2-C").unwrap(),
            SpeakingRate::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    match err {
        SynthesisError::ChunkSynthesis {
            chunk_index,
            attempts,
            cause,
        } => {
            assert_eq!(chunk_index, 0);
            assert_eq!(attempts, 3);
            assert_eq!(cause, SpeechError::Timeout);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_api_key_never_reaches_the_network() {
    let (base_url, accepted) = stalled_server().await;
    let client = CloudTtsClient::new(CloudTtsClientConfig::new("").with_base_url(base_url)).unwrap();
    let adapter = EngineAdapter::new(Arc::new(client), quick(EngineProfile::fast()));

    let err = adapter
        .synthesize(
            0,
            "Once upon a time.",
            &VoiceId::new("en-US-Neural2-C").unwrap(),
            SpeakingRate::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SynthesisError::Configuration { .. }));
    assert_eq!(accepted.load(Ordering::SeqCst), 0);
}
