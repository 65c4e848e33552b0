//! Audio - PCM 处理
//!
//! - pcm: 采样格式与读写
//! - stitcher: 分块音频拼接与交叉淡化
//! - progress: 合成耗时估算与进度快照

mod errors;
pub mod pcm;
pub mod progress;
pub mod stitcher;

pub use errors::AudioError;
pub use pcm::PcmFormat;
pub use progress::{format_duration, ProgressEstimate, ProgressSnapshot};
pub use stitcher::{merge, StitchMode, StitchedAudio, CROSSFADE_BYTES};
