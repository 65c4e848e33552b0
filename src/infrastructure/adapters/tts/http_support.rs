//! 两个 HTTP 引擎共用的传输层辅助函数

use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::application::ports::SpeechError;

/// 错误响应体只保留前 512 个字符写入错误信息
const MAX_ERROR_BODY_CHARS: usize = 512;

pub(super) fn build_client(timeout_secs: u64) -> Result<Client, SpeechError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SpeechError::NetworkError(e.to_string()))
}

/// reqwest 发送失败 -> SpeechError
pub(super) fn map_send_error(e: reqwest::Error) -> SpeechError {
    if e.is_timeout() {
        SpeechError::Timeout
    } else if e.is_connect() {
        SpeechError::NetworkError(format!("Cannot connect to speech service: {}", e))
    } else {
        SpeechError::NetworkError(e.to_string())
    }
}

/// 非 2xx 响应转换为 ServiceError
pub(super) async fn ensure_success(response: Response) -> Result<Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SpeechError::ServiceError {
        status: status.as_u16(),
        message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

pub(super) fn decode_base64_audio(data: &str) -> Result<Vec<u8>, SpeechError> {
    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| SpeechError::MalformedAudio(format!("invalid base64 audio: {}", e)))
}
