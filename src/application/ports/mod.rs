//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_encoder;
mod job_manager;
mod progress_sink;
mod speech_engine;

pub use audio_encoder::{AudioEncoderPort, AudioInfo, EncodeError};
pub use job_manager::{JobError, JobManagerPort, JobState, SynthesisJob};
pub use progress_sink::{NoopProgressSink, ProgressSinkPort, SynthesisEvent};
pub use speech_engine::{SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest};
