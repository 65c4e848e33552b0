//! Application Services - 合成流水线
//!
//! - engine_adapter: 单块合成 + 重试 + 音频校验
//! - engine_registry: 已启用的引擎
//! - progress_tracker: 1Hz 进度心跳
//! - long_audio_pipeline: 分块、合成、拼接的完整流程

mod engine_adapter;
mod engine_registry;
mod long_audio_pipeline;
mod progress_tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use engine_adapter::EngineAdapter;
pub use engine_registry::EngineRegistry;
pub use long_audio_pipeline::{LongAudioPipeline, LongAudioRequest, SynthesizedAudio};
pub use progress_tracker::ProgressTracker;
