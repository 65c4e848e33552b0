//! Job Query Handlers

use std::sync::Arc;

use crate::application::commands::audio_file_name;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioEncoderPort, JobManagerPort, JobState};
use crate::application::queries::job_queries::*;

/// GetJobStatus Handler
pub struct GetJobStatusHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl GetJobStatusHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, query: GetJobStatusQuery) -> Result<JobStatusView, ApplicationError> {
        let job = self
            .job_manager
            .get_job(&query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Job", &query.job_id))?;

        Ok(JobStatusView {
            job_id: job.job_id,
            state: job.state,
            engine: job.request.engine,
            voice_name: job.request.voice_id.to_string(),
            character_count: job.estimate.character_count,
            chunk_count: job.estimate.chunk_count,
            estimated_total_secs: job.estimate.total_secs(),
            progress: job.progress,
            error: job.error_message,
            audio_ready: job.audio.is_some(),
            created_at: job.created_at,
            completed_at: job.completed_at,
        })
    }
}

/// GetJobAudio Handler - 下载已完成任务的 WAV
pub struct GetJobAudioHandler {
    job_manager: Arc<dyn JobManagerPort>,
    encoder: Arc<dyn AudioEncoderPort>,
}

impl GetJobAudioHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>, encoder: Arc<dyn AudioEncoderPort>) -> Self {
        Self {
            job_manager,
            encoder,
        }
    }

    pub fn handle(&self, query: GetJobAudioQuery) -> Result<GetJobAudioResponse, ApplicationError> {
        let job = self
            .job_manager
            .get_job(&query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Job", &query.job_id))?;

        let audio_data = match (job.state, job.audio) {
            (JobState::Completed, Some(audio)) => audio,
            (state, _) => {
                return Err(ApplicationError::invalid_state(format!(
                    "Job {} is {}, audio not available",
                    query.job_id,
                    state.as_str()
                )))
            }
        };

        Ok(GetJobAudioResponse {
            audio_data,
            content_type: self.encoder.content_type().to_string(),
            file_name: audio_file_name(self.encoder.extension()),
        })
    }
}
