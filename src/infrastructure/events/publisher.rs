//! Event Publisher Implementation
//!
//! 按任务分发合成事件，供 WebSocket 订阅

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{JobManagerPort, ProgressSinkPort, SynthesisEvent};

/// 单个任务通道的缓冲区，慢订阅者落后太多会收到 Lagged
const JOB_CHANNEL_CAPACITY: usize = 64;

/// 推送给客户端的任务事件
#[derive(Debug, Clone, Serialize)]
pub struct JobEvent {
    pub job_id: String,
    #[serde(flatten)]
    pub event: SynthesisEvent,
}

/// 事件发布器
pub struct EventPublisher {
    /// job_id -> broadcast sender
    job_channels: DashMap<String, broadcast::Sender<JobEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            job_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅任务事件，通道不存在时创建
    pub fn subscribe_job(&self, job_id: &str) -> broadcast::Receiver<JobEvent> {
        self.job_channels
            .entry(job_id.to_string())
            .or_insert_with(|| broadcast::channel(JOB_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 任务被清理时移除通道
    pub fn unregister_job(&self, job_id: &str) {
        self.job_channels.remove(job_id);
    }

    pub fn channel_count(&self) -> usize {
        self.job_channels.len()
    }

    /// 发布事件到指定任务
    pub fn publish(&self, job_id: &str, event: SynthesisEvent) {
        if let Some(sender) = self.job_channels.get(job_id) {
            let event = JobEvent {
                job_id: job_id.to_string(),
                event,
            };
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// 后台任务的事件出口：更新任务表进度并转发给订阅者
///
/// 终止事件不在这里转发，由 worker 写入任务状态之后再发布，
/// 订阅者收到 completed 时音频一定已经可下载。
pub struct JobProgressSink {
    job_id: String,
    publisher: Arc<EventPublisher>,
    job_manager: Arc<dyn JobManagerPort>,
}

impl JobProgressSink {
    pub fn new(
        job_id: impl Into<String>,
        publisher: Arc<EventPublisher>,
        job_manager: Arc<dyn JobManagerPort>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            publisher,
            job_manager,
        }
    }
}

impl ProgressSinkPort for JobProgressSink {
    fn publish(&self, event: SynthesisEvent) {
        if event.is_terminal() {
            return;
        }
        match &event {
            SynthesisEvent::Progress(snapshot)
            | SynthesisEvent::ChunkCompleted {
                progress: snapshot, ..
            } => {
                self.job_manager
                    .update_progress(&self.job_id, snapshot.clone());
            }
            _ => {}
        }
        self.publisher.publish(&self.job_id, event);
    }
}

/// 同步请求的事件出口：进度只写日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressSink;

impl ProgressSinkPort for TracingProgressSink {
    fn publish(&self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::Progress(snapshot) => {
                tracing::debug!(
                    percent = snapshot.percent,
                    remaining_secs = snapshot.remaining_secs,
                    "{}",
                    snapshot.status
                );
            }
            SynthesisEvent::ChunkCompleted {
                chunk_index,
                chunk_count,
                progress,
                ..
            } => {
                tracing::info!(
                    chunk = chunk_index + 1,
                    chunk_count,
                    elapsed_secs = progress.elapsed_secs,
                    "{}",
                    progress.status
                );
            }
            _ => {}
        }
    }
}
