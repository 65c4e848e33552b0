//! PCM 音频格式
//!
//! 单声道 16-bit 有符号小端 PCM，默认 24kHz

use serde::{Deserialize, Serialize};

use super::AudioError;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
pub const BYTES_PER_SAMPLE: usize = (DEFAULT_BITS_PER_SAMPLE / 8) as usize;

/// PCM 格式描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }
}

impl PcmFormat {
    /// 每帧字节数（所有声道一个采样点）
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// 给定字节数对应的时长（毫秒）
    pub fn duration_ms(&self, byte_len: usize) -> u64 {
        let byte_rate = self.byte_rate() as u64;
        if byte_rate == 0 {
            return 0;
        }
        byte_len as u64 * 1000 / byte_rate
    }

    /// 校验缓冲区是整数个采样帧
    pub fn ensure_whole_frames(&self, byte_len: usize) -> Result<(), AudioError> {
        let block = self.block_align() as usize;
        if block == 0 || byte_len % block != 0 {
            return Err(AudioError::PartialFrame {
                len: byte_len,
                block_align: block,
            });
        }
        Ok(())
    }
}

/// 读取指定字节偏移处的 16-bit 采样
#[inline]
pub fn read_sample(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// 写入指定字节偏移处的 16-bit 采样
#[inline]
pub fn write_sample(buf: &mut [u8], offset: usize, sample: i16) {
    buf[offset..offset + 2].copy_from_slice(&sample.to_le_bytes());
}
