//! HTTP 接口测试（假引擎，无外部依赖）

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tower::util::ServiceExt;

use storyvoice::application::{EngineRegistry, LongAudioPipeline};
use storyvoice::domain::synthesis::{EngineKind, EngineProfile};
use storyvoice::infrastructure::adapters::{FakeTtsClient, FakeTtsClientConfig, WavEncoder};
use storyvoice::infrastructure::events::EventPublisher;
use storyvoice::config::ServerConfig;
use storyvoice::infrastructure::http::{build_router, AppState, HttpServer};
use storyvoice::infrastructure::memory::InMemoryJobManager;
use storyvoice::infrastructure::worker::{SynthesisWorker, SynthesisWorkerConfig};

const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// 只启用快速引擎（假实现），高品质引擎仅登记能力配置
fn app_state() -> Arc<AppState> {
    let fake = FakeTtsClient::new(
        FakeTtsClientConfig::new(EngineKind::Fast).with_latency(Duration::ZERO),
    );
    let engines = EngineRegistry::new()
        .with_engine(Arc::new(fake), EngineProfile::fast())
        .with_profile(EngineProfile::premium());
    let pipeline = Arc::new(LongAudioPipeline::new(
        Arc::new(engines),
        Duration::from_secs(60),
    ));
    let encoder = Arc::new(WavEncoder::new());
    let publisher = Arc::new(EventPublisher::new());
    let (tx, rx) = mpsc::channel(16);
    let job_manager = Arc::new(InMemoryJobManager::new(tx));

    let worker = SynthesisWorker::new(
        SynthesisWorkerConfig::default(),
        rx,
        job_manager.clone(),
        pipeline.clone(),
        encoder.clone(),
        publisher.clone(),
    );
    tokio::spawn(worker.run());

    Arc::new(AppState::new(pipeline, encoder, job_manager, publisher, 1000))
}

fn app() -> Router {
    build_router(app_state(), BODY_LIMIT)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ping_reports_enabled_engines() {
    let app = app();
    let request = Request::builder().uri("/api/ping").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["engines"], json!(["fast"]));
}

#[tokio::test]
async fn estimate_works_for_disabled_engine() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/estimate",
        json!({ "character_count": 9500, "engine": "gemini" }),
    )
    .await;

    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["chunk_count"], 4);
    assert_eq!(json["data"]["engine"], "premium");
    assert_eq!(json["data"]["engine_available"], false);
}

#[tokio::test]
async fn blank_voice_is_a_validation_error() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/synthesize-long-audio",
        json!({ "text": "Once upon a time.", "voice_name": "  ", "engine": "fast" }),
    )
    .await;

    assert_eq!(json["errno"], 400);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn oversized_story_is_rejected() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/synthesize-long-audio",
        json!({ "text": "a".repeat(1001), "voiceName": "en-US-Neural2-C", "engine": "fast" }),
    )
    .await;

    assert_eq!(json["errno"], 400);
}

#[tokio::test]
async fn disabled_engine_reports_service_unavailable() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/synthesize-long-audio",
        json!({ "text": "Once upon a time.", "voice_name": "Kore", "engine": "premium" }),
    )
    .await;

    assert_eq!(json["errno"], 503);
}

#[tokio::test]
async fn synthesize_returns_base64_wav() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/synthesize-long-audio",
        json!({
            "text": "Once upon a time.",
            "voice_name": "en-US-Neural2-C",
            "engine": "google-cloud",
            "speaking_rate": 1.25
        }),
    )
    .await;

    assert_eq!(json["errno"], 0, "{json}");
    let data = &json["data"];
    assert_eq!(data["mime_type"], "audio/wav");
    assert_eq!(data["chunk_count"], 1);

    let wav = STANDARD.decode(data["audio_data"].as_str().unwrap()).unwrap();
    assert_eq!(wav.len() as u64, data["byte_length"].as_u64().unwrap());
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert!(wav.len() > 44);
}

#[tokio::test]
async fn preview_returns_short_clip() {
    let app = app();
    let json = post_json(
        &app,
        "/api/tts/preview",
        json!({ "voice_name": "en-GB-Neural2-B", "engine": "fast" }),
    )
    .await;

    assert_eq!(json["errno"], 0, "{json}");
    assert!(json["data"]["duration_ms"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn background_job_can_be_downloaded() {
    let app = app();
    let submitted = post_json(
        &app,
        "/api/tts/jobs/submit",
        json!({ "text": "Hello there. Goodbye.", "voice_name": "Kore", "engine": "fast" }),
    )
    .await;
    assert_eq!(submitted["errno"], 0, "{submitted}");
    let job_id = submitted["data"]["job_id"].as_str().unwrap().to_string();

    let mut state = String::new();
    for _ in 0..200 {
        let status = post_json(&app, "/api/tts/jobs/status", json!({ "job_id": job_id })).await;
        state = status["data"]["state"].as_str().unwrap().to_string();
        if state == "completed" || state == "failed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(state, "completed");

    let request = Request::builder()
        .uri(format!("/api/tts/jobs/{}/audio", job_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("story_audio_"));

    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");

    // 已完成的任务取消后保持原状态
    let cancelled = post_json(&app, "/api/tts/jobs/cancel", json!({ "job_id": job_id })).await;
    assert_eq!(cancelled["data"]["state"], "completed");
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = app();
    let json = post_json(&app, "/api/tts/jobs/status", json!({ "job_id": "missing" })).await;
    assert_eq!(json["errno"], 404);
}

#[tokio::test]
async fn server_binds_ephemeral_port_and_shuts_down() {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    };
    let server = HttpServer::bind(&config, app_state()).await.unwrap();
    let addr = server.local_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_with_shutdown(async move {
        let _ = stop_rx.await;
    }));

    let json: Value = reqwest::get(format!("http://{}/api/ping", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["errno"], 0);

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
