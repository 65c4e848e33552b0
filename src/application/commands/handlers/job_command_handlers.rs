//! Job Command Handlers

use std::sync::Arc;

use crate::application::commands::job_commands::*;
use crate::application::commands::synthesis_commands::build_request;
use crate::application::error::ApplicationError;
use crate::application::ports::{JobManagerPort, SynthesisJob};
use crate::application::services::LongAudioPipeline;

/// SubmitSynthesisJob Handler - 校验后入队
pub struct SubmitSynthesisJobHandler {
    job_manager: Arc<dyn JobManagerPort>,
    pipeline: Arc<LongAudioPipeline>,
    max_text_chars: usize,
}

impl SubmitSynthesisJobHandler {
    pub fn new(
        job_manager: Arc<dyn JobManagerPort>,
        pipeline: Arc<LongAudioPipeline>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            job_manager,
            pipeline,
            max_text_chars,
        }
    }

    pub fn handle(&self, cmd: SubmitSynthesisJobCommand) -> Result<SubmitSynthesisJobResponse, ApplicationError> {
        let request = build_request(
            cmd.text,
            &cmd.voice_name,
            cmd.engine,
            cmd.speaking_rate,
            self.max_text_chars,
        )?;

        // 未启用的引擎在提交时就拒绝，不必排队
        self.pipeline.engines().adapter(request.engine)?;

        let estimate = self
            .pipeline
            .estimate(request.character_count(), request.engine);
        let job = SynthesisJob::new(request, estimate.clone());
        let job_id = self.job_manager.submit(job)?;

        tracing::info!(
            job_id = %job_id,
            engine = %estimate.engine,
            chunk_count = estimate.chunk_count,
            estimated_secs = estimate.total_secs(),
            "Synthesis job submitted"
        );

        Ok(SubmitSynthesisJobResponse { job_id, estimate })
    }
}

/// CancelSynthesisJob Handler
pub struct CancelSynthesisJobHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl CancelSynthesisJobHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, cmd: CancelSynthesisJobCommand) -> Result<CancelSynthesisJobResponse, ApplicationError> {
        let state = self.job_manager.cancel(&cmd.job_id)?;
        tracing::info!(job_id = %cmd.job_id, state = state.as_str(), "Cancel requested");
        Ok(CancelSynthesisJobResponse {
            job_id: cmd.job_id,
            state,
        })
    }
}
