//! Synthesis Worker - 后台长音频合成
//!
//! 从队列消费任务 ID，执行流水线，封装 WAV 并写回任务表。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::error::SynthesisError;
use crate::application::ports::{
    AudioEncoderPort, JobManagerPort, JobState, SynthesisEvent,
};
use crate::application::services::{LongAudioPipeline, SynthesizedAudio};
use crate::infrastructure::events::{EventPublisher, JobProgressSink};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct SynthesisWorkerConfig {
    /// 最大并发合成任务数
    pub max_concurrent: usize,
}

impl Default for SynthesisWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 合成 Worker
pub struct SynthesisWorker {
    config: SynthesisWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    job_manager: Arc<dyn JobManagerPort>,
    pipeline: Arc<LongAudioPipeline>,
    encoder: Arc<dyn AudioEncoderPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SynthesisWorker {
    pub fn new(
        config: SynthesisWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        job_manager: Arc<dyn JobManagerPort>,
        pipeline: Arc<LongAudioPipeline>,
        encoder: Arc<dyn AudioEncoderPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            job_manager,
            pipeline,
            encoder,
            event_publisher,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "SynthesisWorker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent.max(1),
        ));

        while let Some(job_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            let job_manager = self.job_manager.clone();
            let pipeline = self.pipeline.clone();
            let encoder = self.encoder.clone();
            let event_publisher = self.event_publisher.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成

                Self::process_job(&job_id, job_manager, pipeline, encoder, event_publisher)
                    .await;
            });
        }

        tracing::info!("SynthesisWorker stopped");
    }

    /// 处理单个任务
    async fn process_job(
        job_id: &str,
        job_manager: Arc<dyn JobManagerPort>,
        pipeline: Arc<LongAudioPipeline>,
        encoder: Arc<dyn AudioEncoderPort>,
        event_publisher: Arc<EventPublisher>,
    ) {
        let job = match job_manager.get_job(job_id) {
            Some(j) => j,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, skipping");
                return;
            }
        };

        // 排队期间被取消
        if job.state == JobState::Cancelled {
            tracing::debug!(job_id = %job_id, "Job cancelled while pending, skipping");
            event_publisher.publish(job_id, SynthesisEvent::Cancelled { next_chunk: 0 });
            return;
        }
        if job.state.is_terminal() {
            tracing::debug!(job_id = %job_id, state = ?job.state, "Job already finished, skipping");
            return;
        }

        if let Err(e) = job_manager.set_state(job_id, JobState::Synthesizing) {
            // 读取快照之后、开始之前被取消
            let cancelled = job_manager
                .get_job(job_id)
                .is_some_and(|j| j.state == JobState::Cancelled);
            if cancelled {
                tracing::debug!(job_id = %job_id, "Job cancelled before start");
                event_publisher.publish(job_id, SynthesisEvent::Cancelled { next_chunk: 0 });
            } else {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to start job");
            }
            return;
        }

        let sink = Arc::new(JobProgressSink::new(
            job_id,
            event_publisher.clone(),
            job_manager.clone(),
        ));

        let result = pipeline.run(&job.request, sink, job.cancel.clone()).await;

        let event = match result {
            Ok(audio) => Self::complete(job_id, &audio, &*job_manager, &*encoder),
            Err(SynthesisError::Cancelled { next_chunk }) => {
                if let Err(e) = job_manager.set_state(job_id, JobState::Cancelled) {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to mark job cancelled");
                }
                SynthesisEvent::Cancelled { next_chunk }
            }
            Err(e) => {
                Self::fail(job_id, e.to_string(), &*job_manager);
                SynthesisEvent::Failed {
                    error: e.to_string(),
                    chunk_index: e.chunk_index(),
                }
            }
        };

        event_publisher.publish(job_id, event);
    }

    /// 封装 WAV 并写回任务表，返回要发布的终止事件
    fn complete(
        job_id: &str,
        audio: &SynthesizedAudio,
        job_manager: &dyn JobManagerPort,
        encoder: &dyn AudioEncoderPort,
    ) -> SynthesisEvent {
        let wav = match encoder.encode(&audio.pcm, audio.format) {
            Ok(wav) => wav,
            Err(e) => {
                let message = format!("Failed to encode audio: {}", e);
                Self::fail(job_id, message.clone(), job_manager);
                return SynthesisEvent::Failed {
                    error: message,
                    chunk_index: None,
                };
            }
        };

        let byte_length = wav.len();
        if let Err(e) = job_manager.set_completed(job_id, wav) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to store job audio");
            return SynthesisEvent::Failed {
                error: e.to_string(),
                chunk_index: None,
            };
        }

        tracing::info!(
            job_id = %job_id,
            chunk_count = audio.chunk_count,
            byte_length,
            duration_ms = audio.duration_ms,
            elapsed_secs = audio.elapsed_secs,
            "Job completed"
        );

        SynthesisEvent::Completed {
            chunk_count: audio.chunk_count,
            byte_length,
            duration_ms: audio.duration_ms,
            elapsed_secs: audio.elapsed_secs,
        }
    }

    fn fail(job_id: &str, message: String, job_manager: &dyn JobManagerPort) {
        tracing::warn!(job_id = %job_id, error = %message, "Job failed");
        if let Err(e) = job_manager.set_failed(job_id, message) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to mark job failed");
        }
    }
}

/// 定期清理已结束的任务及其事件通道
pub async fn run_job_janitor(
    job_manager: Arc<dyn JobManagerPort>,
    event_publisher: Arc<EventPublisher>,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let retention = chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::days(365));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                for job_id in job_manager.purge_finished(retention) {
                    event_publisher.unregister_job(&job_id);
                }
            }
        }
    }

    tracing::debug!("Job janitor stopped");
}
