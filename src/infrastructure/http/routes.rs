//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                          GET   健康检查
//! - /api/tts/synthesize-long-audio     POST  同步合成长音频（base64 WAV）
//! - /api/tts/preview                   POST  音色试听
//! - /api/tts/estimate                  POST  估算合成耗时
//! - /api/tts/jobs/submit               POST  提交后台合成任务
//! - /api/tts/jobs/status               POST  查询任务状态
//! - /api/tts/jobs/cancel               POST  取消任务
//! - /api/tts/jobs/{job_id}/audio       GET   下载任务音频
//! - /ws/jobs/{job_id}                  WS    任务进度事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/jobs/:job_id", get(handlers::job_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/tts", tts_routes())
}

/// TTS 路由
fn tts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/synthesize-long-audio", post(handlers::synthesize_long_audio))
        .route("/preview", post(handlers::preview_voice))
        .route("/estimate", post(handlers::estimate_duration))
        .nest("/jobs", job_routes())
}

/// Job 路由
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_job))
        .route("/status", post(handlers::job_status))
        .route("/cancel", post(handlers::cancel_job))
        .route("/:job_id/audio", get(handlers::job_audio))
}
