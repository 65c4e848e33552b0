//! Audio - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("交叉淡化窗口必须是偶数字节: {0}")]
    OddCrossfadeWindow(usize),

    #[error("第 {index} 块音频长度 {len} 不是整数个 16-bit 采样")]
    MisalignedBuffer { index: usize, len: usize },

    #[error("PCM 长度 {len} 不是帧大小 {block_align} 的整数倍")]
    PartialFrame { len: usize, block_align: usize },
}
