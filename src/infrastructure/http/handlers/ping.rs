//! Ping Handler
//!
//! 健康检查，同时报告已启用的引擎

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::synthesis::EngineKind;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub engines: Vec<EngineKind>,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PingResponse>> {
    Json(ApiResponse::success(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        engines: state.engines.available(),
    }))
}
