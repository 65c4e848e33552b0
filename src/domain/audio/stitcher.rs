//! 音频拼接器
//!
//! 把逐块合成的 PCM 缓冲区合并成一条连续音频：
//! - Concat：逐字节直接拼接（高品质引擎，分块边界本身连续）
//! - Crossfade：在每个边界做 20ms 线性交叉淡化，消除独立合成带来的爆音
//!
//! Crossfade 模式下每个边界把两个窗口融合成一个窗口，
//! 输出长度 = 输入总长 - (块数 - 1) * 窗口字节数。

use super::pcm::{read_sample, write_sample, BYTES_PER_SAMPLE};
use super::AudioError;
use crate::domain::synthesis::EngineProfile;

/// 交叉淡化窗口：480 个采样 = 20ms @ 24kHz
pub const CROSSFADE_SAMPLES: usize = 480;
pub const CROSSFADE_BYTES: usize = CROSSFADE_SAMPLES * BYTES_PER_SAMPLE;

/// 拼接方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchMode {
    Concat,
    Crossfade { window_bytes: usize },
}

impl StitchMode {
    /// 由引擎能力决定拼接方式
    pub fn for_profile(profile: &EngineProfile) -> Self {
        if profile.needs_crossfade {
            StitchMode::Crossfade {
                window_bytes: CROSSFADE_BYTES,
            }
        } else {
            StitchMode::Concat
        }
    }

    /// 窗口必须落在 16-bit 采样边界上
    pub fn validate(&self) -> Result<(), AudioError> {
        match *self {
            StitchMode::Crossfade { window_bytes } if window_bytes % BYTES_PER_SAMPLE != 0 => {
                Err(AudioError::OddCrossfadeWindow(window_bytes))
            }
            _ => Ok(()),
        }
    }
}

/// 拼接中的音频
///
/// 只允许追加；每个追加的缓冲区被消费，不再复用。
#[derive(Debug)]
pub struct StitchedAudio {
    mode: StitchMode,
    pcm: Vec<u8>,
    segments: usize,
}

impl StitchedAudio {
    pub fn new(mode: StitchMode) -> Result<Self, AudioError> {
        mode.validate()?;
        Ok(Self {
            mode,
            pcm: Vec::new(),
            segments: 0,
        })
    }

    /// 追加下一块音频
    pub fn append(&mut self, buffer: Vec<u8>) -> Result<(), AudioError> {
        if buffer.len() % BYTES_PER_SAMPLE != 0 {
            return Err(AudioError::MisalignedBuffer {
                index: self.segments,
                len: buffer.len(),
            });
        }

        if self.segments == 0 {
            self.pcm = buffer;
            self.segments = 1;
            return Ok(());
        }

        match self.mode {
            StitchMode::Concat => self.pcm.extend_from_slice(&buffer),
            StitchMode::Crossfade { window_bytes } => {
                // 缓冲区比窗口短时收缩窗口，并保持偶数字节
                let window = window_bytes.min(self.pcm.len()).min(buffer.len()) & !1;
                let tail_start = self.pcm.len() - window;
                crossfade_into(&mut self.pcm[tail_start..], &buffer[..window]);
                self.pcm.extend_from_slice(&buffer[window..]);

                if window < window_bytes {
                    tracing::debug!(
                        segment = self.segments,
                        window,
                        configured = window_bytes,
                        "Crossfade window shrunk for short buffer"
                    );
                }
            }
        }

        self.segments += 1;
        Ok(())
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    pub fn into_pcm(self) -> Vec<u8> {
        self.pcm
    }
}

/// 合并一组有序的 PCM 缓冲区
pub fn merge(buffers: Vec<Vec<u8>>, mode: StitchMode) -> Result<Vec<u8>, AudioError> {
    let mut stitched = StitchedAudio::new(mode)?;
    for buffer in buffers {
        stitched.append(buffer)?;
    }
    Ok(stitched.into_pcm())
}

/// 线性交叉淡化：`tail` 原地替换为 tail→head 的混合结果
///
/// 字节偏移 j 处 progress = j / window，输出
/// `round(prev * (1 - progress) + next * progress)` 并钳制到 i16 范围。
pub fn crossfade_into(tail: &mut [u8], head: &[u8]) {
    let window = tail.len().min(head.len()) & !1;
    if window == 0 {
        return;
    }

    for j in (0..window).step_by(BYTES_PER_SAMPLE) {
        let progress = j as f64 / window as f64;
        let prev = read_sample(tail, j) as f64;
        let next = read_sample(head, j) as f64;
        let mixed = (prev * (1.0 - progress) + next * progress).round();
        let clamped = mixed.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        write_sample(tail, j, clamped);
    }
}
