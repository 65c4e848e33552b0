//! 进度跟踪
//!
//! 合成期间每秒发布一次 [`SynthesisEvent::Progress`]，块完成时发布
//! [`SynthesisEvent::ChunkCompleted`]。定时任务随 tracker 一起销毁，
//! 也随父取消令牌一起停止。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::application::ports::{ProgressSinkPort, SynthesisEvent};
use crate::domain::audio::{ProgressEstimate, ProgressSnapshot};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct TrackerState {
    estimate: ProgressEstimate,
    chunk_count: usize,
    chunks_done: AtomicUsize,
    started: Instant,
}

impl TrackerState {
    fn snapshot(&self) -> ProgressSnapshot {
        self.estimate.snapshot(
            self.started.elapsed().as_secs(),
            self.chunks_done.load(Ordering::Acquire),
            self.chunk_count,
        )
    }
}

pub struct ProgressTracker {
    state: Arc<TrackerState>,
    sink: Arc<dyn ProgressSinkPort>,
    _ticker: DropGuard,
}

impl ProgressTracker {
    /// 启动 1Hz 定时任务
    pub fn start(
        estimate: ProgressEstimate,
        chunk_count: usize,
        sink: Arc<dyn ProgressSinkPort>,
        parent: &CancellationToken,
    ) -> Self {
        let state = Arc::new(TrackerState {
            estimate,
            chunk_count,
            chunks_done: AtomicUsize::new(0),
            started: Instant::now(),
        });
        let token = parent.child_token();

        let ticker_state = state.clone();
        let ticker_sink = sink.clone();
        let ticker_token = token.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(ticker_state.started + TICK_INTERVAL, TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = ticker_token.cancelled() => break,
                    _ = interval.tick() => {
                        ticker_sink.publish(SynthesisEvent::Progress(ticker_state.snapshot()));
                    }
                }
            }
            tracing::trace!("Progress ticker stopped");
        });

        Self {
            state,
            sink,
            _ticker: token.drop_guard(),
        }
    }

    /// 记录第 `chunk_index` 块完成
    pub fn chunk_completed(&self, chunk_index: usize, bytes: usize) {
        self.state
            .chunks_done
            .store(chunk_index + 1, Ordering::Release);
        self.sink.publish(SynthesisEvent::ChunkCompleted {
            chunk_index,
            chunk_count: self.state.chunk_count,
            bytes,
            progress: self.state.snapshot(),
        });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.snapshot()
    }

    /// 停止定时任务并返回最终快照
    pub fn finish(self) -> ProgressSnapshot {
        self.state.snapshot()
    }
}
