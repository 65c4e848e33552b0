//! In-Memory Job Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{JobError, JobManagerPort, JobState, SynthesisJob};
use crate::domain::audio::ProgressSnapshot;

/// 内存任务管理器
pub struct InMemoryJobManager {
    /// job_id -> SynthesisJob
    jobs: DashMap<String, SynthesisJob>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryJobManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            jobs: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// 终止状态只允许原地重复设置
    fn transition(job: &mut SynthesisJob, state: JobState) -> Result<(), JobError> {
        if job.state.is_terminal() && job.state != state {
            return Err(JobError::InvalidStateTransition(format!(
                "{} -> {}",
                job.state.as_str(),
                state.as_str()
            )));
        }

        let old_state = job.state;
        job.state = state;
        if state.is_terminal() && job.completed_at.is_none() {
            job.completed_at = Some(Utc::now());
        }

        tracing::debug!(
            job_id = %job.job_id,
            old_state = ?old_state,
            new_state = ?state,
            "Job state changed"
        );
        Ok(())
    }
}

impl JobManagerPort for InMemoryJobManager {
    fn submit(&self, job: SynthesisJob) -> Result<String, JobError> {
        let job_id = job.job_id.clone();
        if self.jobs.contains_key(&job_id) {
            return Err(JobError::AlreadyExists(job_id));
        }

        self.jobs.insert(job_id.clone(), job);

        // 发送到队列，失败时撤销登记
        if let Err(e) = self.queue_sender.try_send(job_id.clone()) {
            self.jobs.remove(&job_id);
            tracing::warn!(job_id = %job_id, error = %e, "Failed to enqueue job");
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => JobError::QueueClosed,
            });
        }

        tracing::debug!(job_id = %job_id, "Job submitted");
        Ok(job_id)
    }

    fn get_job(&self, job_id: &str) -> Option<SynthesisJob> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    fn set_state(&self, job_id: &str, state: JobState) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        Self::transition(&mut job, state)
    }

    fn update_progress(&self, job_id: &str, progress: ProgressSnapshot) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            if !job.state.is_terminal() {
                job.progress = Some(progress);
            }
        }
    }

    fn set_completed(&self, job_id: &str, audio: Vec<u8>) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        Self::transition(&mut job, JobState::Completed)?;
        job.audio = Some(Arc::new(audio));
        Ok(())
    }

    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        Self::transition(&mut job, JobState::Failed)?;
        job.error_message = Some(error);
        Ok(())
    }

    fn cancel(&self, job_id: &str) -> Result<JobState, JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        match job.state {
            JobState::Pending => {
                job.cancel.cancel();
                Self::transition(&mut job, JobState::Cancelled)?;
            }
            // worker 观察到令牌后写入 Cancelled
            JobState::Synthesizing => job.cancel.cancel(),
            _ => {}
        }
        Ok(job.state)
    }

    fn purge_finished(&self, retention: chrono::Duration) -> Vec<String> {
        let cutoff = Utc::now() - retention;
        let expired: Vec<String> = self
            .jobs
            .iter()
            .filter(|j| j.state.is_terminal() && j.completed_at.is_some_and(|t| t <= cutoff))
            .map(|j| j.job_id.clone())
            .collect();

        for job_id in &expired {
            self.jobs.remove(job_id);
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Finished jobs purged");
        }
        expired
    }
}
