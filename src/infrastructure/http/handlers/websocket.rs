//! WebSocket Handler - 任务进度推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use super::jobs::JobStatusDto;
use crate::application::{GetJobStatusHandler, GetJobStatusQuery};
use crate::infrastructure::events::JobEvent;
use crate::infrastructure::http::state::AppState;

/// 连接建立后首先发送的状态快照
#[derive(Debug, Serialize)]
struct StatusFrame {
    job_id: String,
    event: &'static str,
    data: JobStatusDto,
}

/// 任务 WebSocket 连接处理
pub async fn job_websocket_handler(
    ws: WebSocketUpgrade,
    Path(job_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_job_socket(socket, job_id, state))
}

async fn handle_job_socket(socket: WebSocket, job_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 先订阅再取快照，避免漏掉两者之间的事件
    let mut event_rx = state.event_publisher.subscribe_job(&job_id);

    let snapshot = send_status_snapshot(&mut sender, &state.job_status_handler, &job_id).await;
    match snapshot {
        Snapshot::Running => {}
        Snapshot::UnknownJob => {
            state.event_publisher.unregister_job(&job_id);
            let _ = sender.close().await;
            return;
        }
        Snapshot::Finished => {
            let _ = sender.close().await;
            return;
        }
        Snapshot::SendFailed => return,
    }

    tracing::info!(job_id = %job_id, "WebSocket connected");

    let job_id_for_forward = job_id.clone();
    let job_id_for_receive = job_id.clone();

    let mut forward_task = tokio::spawn(async move {
        forward_job_events(&mut sender, &mut event_rx, &job_id_for_forward).await;
    });

    // 接收客户端消息（只处理关闭）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(job_id = %job_id_for_receive, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(job_id = %job_id_for_receive, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    tracing::info!(job_id = %job_id, "WebSocket disconnected");
}

/// 快照发送结果
#[derive(Debug, PartialEq, Eq)]
enum Snapshot {
    /// 任务仍在进行，继续推送事件
    Running,
    Finished,
    UnknownJob,
    SendFailed,
}

async fn send_status_snapshot<S>(
    sender: &mut S,
    status_handler: &GetJobStatusHandler,
    job_id: &str,
) -> Snapshot
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let view = match status_handler.handle(GetJobStatusQuery {
        job_id: job_id.to_string(),
    }) {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "WebSocket connection rejected: unknown job");
            return Snapshot::UnknownJob;
        }
    };

    let finished = view.state.is_terminal();
    let frame = StatusFrame {
        job_id: job_id.to_string(),
        event: "status",
        data: view.into(),
    };
    if let Err(e) = send_json(sender, &frame).await {
        tracing::debug!(job_id = %job_id, error = %e, "Failed to send status snapshot");
        return Snapshot::SendFailed;
    }

    if finished {
        Snapshot::Finished
    } else {
        Snapshot::Running
    }
}

/// 转发任务事件，终止事件之后关闭连接
async fn forward_job_events<S>(
    sender: &mut S,
    event_rx: &mut broadcast::Receiver<JobEvent>,
    job_id: &str,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    loop {
        let event = match event_rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(job_id = %job_id, skipped, "WebSocket subscriber lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let terminal = event.event.is_terminal();
        if let Err(e) = send_json(sender, &event).await {
            tracing::debug!(job_id = %job_id, error = %e, "Failed to send WebSocket message");
            break;
        }
        if terminal {
            let _ = sender.close().await;
            break;
        }
    }
}

async fn send_json<S, T>(sender: &mut S, value: &T) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    sender
        .send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
