//! Synthesis Command Handlers

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::commands::synthesis_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioEncoderPort, ProgressSinkPort};
use crate::application::services::{EngineRegistry, LongAudioPipeline};
use crate::domain::synthesis::{SpeakingRate, VoiceId, PREVIEW_TEXT};

/// SynthesizeLongAudio Handler - 同步合成整段文本并封装为 WAV
pub struct SynthesizeLongAudioHandler {
    pipeline: Arc<LongAudioPipeline>,
    encoder: Arc<dyn AudioEncoderPort>,
    max_text_chars: usize,
}

impl SynthesizeLongAudioHandler {
    pub fn new(
        pipeline: Arc<LongAudioPipeline>,
        encoder: Arc<dyn AudioEncoderPort>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            pipeline,
            encoder,
            max_text_chars,
        }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizeLongAudioCommand,
        sink: Arc<dyn ProgressSinkPort>,
        cancel: CancellationToken,
    ) -> Result<SynthesizeLongAudioResponse, ApplicationError> {
        let request = cmd.into_request(self.max_text_chars)?;
        let audio = self.pipeline.run(&request, sink, cancel).await?;
        let audio_data = self.encoder.encode(&audio.pcm, audio.format)?;

        tracing::info!(
            engine = %audio.engine,
            chunk_count = audio.chunk_count,
            wav_bytes = audio_data.len(),
            duration_ms = audio.duration_ms,
            "Long audio encoded"
        );

        Ok(SynthesizeLongAudioResponse {
            audio_data,
            content_type: self.encoder.content_type().to_string(),
            file_name: audio_file_name(self.encoder.extension()),
            engine: audio.engine,
            chunk_count: audio.chunk_count,
            duration_ms: audio.duration_ms,
            elapsed_secs: audio.elapsed_secs,
        })
    }
}

/// PreviewVoice Handler - 用固定短句试听音色
pub struct PreviewVoiceHandler {
    engines: Arc<EngineRegistry>,
    encoder: Arc<dyn AudioEncoderPort>,
}

impl PreviewVoiceHandler {
    pub fn new(engines: Arc<EngineRegistry>, encoder: Arc<dyn AudioEncoderPort>) -> Self {
        Self { engines, encoder }
    }

    pub async fn handle(&self, cmd: PreviewVoiceCommand) -> Result<PreviewVoiceResponse, ApplicationError> {
        let voice_id = VoiceId::new(cmd.voice_name)?;
        let speaking_rate = match cmd.speaking_rate {
            Some(rate) => SpeakingRate::new(rate)?,
            None => SpeakingRate::default(),
        };
        let adapter = self.engines.adapter(cmd.engine)?;

        let pcm = adapter
            .synthesize(0, PREVIEW_TEXT, &voice_id, speaking_rate, &CancellationToken::new())
            .await?;
        let format = adapter.format();
        let audio_data = self.encoder.encode(&pcm, format)?;

        tracing::debug!(engine = %cmd.engine, voice = %voice_id, bytes = pcm.len(), "Voice preview ready");

        Ok(PreviewVoiceResponse {
            audio_data,
            content_type: self.encoder.content_type().to_string(),
            duration_ms: format.duration_ms(pcm.len()),
        })
    }
}
