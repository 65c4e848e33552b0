//! Audio Encoder Adapter - 输出容器封装

mod wav_encoder;

pub use wav_encoder::{WavEncoder, WAV_HEADER_LEN};
