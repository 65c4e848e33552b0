//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CancelSynthesisJobHandler, PreviewVoiceHandler, SubmitSynthesisJobHandler,
    SynthesizeLongAudioHandler,
    // Query handlers
    EstimateDurationHandler, GetJobAudioHandler, GetJobStatusHandler,
    // Ports & services
    AudioEncoderPort, EngineRegistry, JobManagerPort, LongAudioPipeline,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub engines: Arc<EngineRegistry>,
    pub job_manager: Arc<dyn JobManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeLongAudioHandler,
    pub preview_handler: PreviewVoiceHandler,
    pub submit_job_handler: SubmitSynthesisJobHandler,
    pub cancel_job_handler: CancelSynthesisJobHandler,

    // ========== Query Handlers ==========
    pub estimate_handler: EstimateDurationHandler,
    pub job_status_handler: GetJobStatusHandler,
    pub job_audio_handler: GetJobAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        pipeline: Arc<LongAudioPipeline>,
        encoder: Arc<dyn AudioEncoderPort>,
        job_manager: Arc<dyn JobManagerPort>,
        event_publisher: Arc<EventPublisher>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            // Ports
            engines: pipeline.engines().clone(),
            job_manager: job_manager.clone(),
            event_publisher,

            // Command handlers
            synthesize_handler: SynthesizeLongAudioHandler::new(
                pipeline.clone(),
                encoder.clone(),
                max_text_chars,
            ),
            preview_handler: PreviewVoiceHandler::new(pipeline.engines().clone(), encoder.clone()),
            submit_job_handler: SubmitSynthesisJobHandler::new(
                job_manager.clone(),
                pipeline.clone(),
                max_text_chars,
            ),
            cancel_job_handler: CancelSynthesisJobHandler::new(job_manager.clone()),

            // Query handlers
            estimate_handler: EstimateDurationHandler::new(pipeline),
            job_status_handler: GetJobStatusHandler::new(job_manager.clone()),
            job_audio_handler: GetJobAudioHandler::new(job_manager, encoder),
        }
    }
}
