//! Progress Sink Port - 合成事件出口
//!
//! 流水线只负责产生事件，谁来消费（WebSocket、任务表、日志）由调用方决定。

use serde::Serialize;

use crate::domain::audio::ProgressSnapshot;
use crate::domain::synthesis::EngineKind;

/// 合成过程事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SynthesisEvent {
    /// 分块完成，开始合成
    Started {
        engine: EngineKind,
        character_count: usize,
        chunk_count: usize,
        estimated_total_secs: u64,
    },
    /// 1Hz 进度心跳
    Progress(ProgressSnapshot),
    /// 一个块合成并拼接完成
    ChunkCompleted {
        chunk_index: usize,
        chunk_count: usize,
        bytes: usize,
        progress: ProgressSnapshot,
    },
    Completed {
        chunk_count: usize,
        byte_length: usize,
        duration_ms: u64,
        elapsed_secs: u64,
    },
    Failed {
        error: String,
        chunk_index: Option<usize>,
    },
    Cancelled {
        next_chunk: usize,
    },
}

impl SynthesisEvent {
    /// 终止事件之后不会再有同一任务的事件
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SynthesisEvent::Completed { .. }
                | SynthesisEvent::Failed { .. }
                | SynthesisEvent::Cancelled { .. }
        )
    }
}

/// Progress Sink Port
///
/// `publish` 可能从进度定时任务中调用，不得阻塞。
pub trait ProgressSinkPort: Send + Sync {
    fn publish(&self, event: SynthesisEvent);
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSinkPort for NoopProgressSink {
    fn publish(&self, _event: SynthesisEvent) {}
}
