//! WAV Encoder - RIFF/WAVE 容器封装
//!
//! 输出固定 44 字节头 + 原始 PCM：
//!
//! | offset | size | value |
//! |--------|------|-------|
//! | 0  | 4 | "RIFF" |
//! | 4  | 4 | 36 + data_size |
//! | 8  | 4 | "WAVE" |
//! | 12 | 4 | "fmt " |
//! | 16 | 4 | 16 |
//! | 20 | 2 | 1 (PCM) |
//! | 22 | 2 | channels |
//! | 24 | 4 | sample_rate |
//! | 28 | 4 | byte_rate |
//! | 32 | 2 | block_align |
//! | 34 | 2 | bits_per_sample |
//! | 36 | 4 | "data" |
//! | 40 | 4 | data_size |
//!
//! 同时提供容器解析，用于剥离引擎返回音频里的 WAV 头。

use crate::application::ports::{AudioEncoderPort, AudioInfo, EncodeError};
use crate::domain::audio::PcmFormat;

pub const WAV_HEADER_LEN: usize = 44;

const WAVE_FORMAT_PCM: u16 = 1;

/// fmt chunk 内容
#[derive(Debug, Clone, Copy, PartialEq)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// 解析出的 WAV 结构
#[derive(Debug, Clone, Copy)]
struct WavLayout {
    fmt: FmtChunk,
    data_start: usize,
    data_size: usize,
}

/// WAV 编码器
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

impl WavEncoder {
    pub fn new() -> Self {
        Self
    }

    /// 是否以 RIFF/WAVE 头开始
    pub fn is_wav(data: &[u8]) -> bool {
        data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
    }

    /// 拆出 PCM 格式和 data chunk
    pub fn split_container(data: &[u8]) -> Result<(PcmFormat, &[u8]), EncodeError> {
        let layout = parse_layout(data)?;
        if layout.fmt.audio_format != WAVE_FORMAT_PCM {
            return Err(EncodeError::UnsupportedFormat(format!(
                "WAV audio format {} is not PCM",
                layout.fmt.audio_format
            )));
        }

        let format = PcmFormat {
            sample_rate: layout.fmt.sample_rate,
            channels: layout.fmt.num_channels,
            bits_per_sample: layout.fmt.bits_per_sample,
        };
        Ok((format, &data[layout.data_start..layout.data_start + layout.data_size]))
    }

    fn write_header(wav: &mut Vec<u8>, format: PcmFormat, data_size: u32) {
        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
        wav.extend_from_slice(&format.channels.to_le_bytes());
        wav.extend_from_slice(&format.sample_rate.to_le_bytes());
        wav.extend_from_slice(&format.byte_rate().to_le_bytes());
        wav.extend_from_slice(&format.block_align().to_le_bytes());
        wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_size.to_le_bytes());
    }
}

impl AudioEncoderPort for WavEncoder {
    fn encode(&self, pcm: &[u8], format: PcmFormat) -> Result<Vec<u8>, EncodeError> {
        format
            .ensure_whole_frames(pcm.len())
            .map_err(|e| EncodeError::InvalidInput(e.to_string()))?;

        // RIFF 大小字段是 u32，且包含 36 字节头
        let data_size = u32::try_from(pcm.len())
            .ok()
            .filter(|size| size.checked_add(36).is_some())
            .ok_or(EncodeError::TooLarge(pcm.len()))?;

        let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
        Self::write_header(&mut wav, format, data_size);
        wav.extend_from_slice(pcm);

        debug_assert_eq!(wav.len(), WAV_HEADER_LEN + pcm.len());
        Ok(wav)
    }

    fn get_audio_info(&self, data: &[u8]) -> Result<AudioInfo, EncodeError> {
        let (format, pcm) = Self::split_container(data)?;
        Ok(AudioInfo {
            duration_ms: format.duration_ms(pcm.len()),
            sample_rate: format.sample_rate,
            channels: format.channels,
            bits_per_sample: format.bits_per_sample,
            data_size: pcm.len(),
        })
    }

    fn content_type(&self) -> &'static str {
        "audio/wav"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// 遍历 RIFF chunk，找到 fmt 和 data
fn parse_layout(data: &[u8]) -> Result<WavLayout, EncodeError> {
    if !WavEncoder::is_wav(data) {
        return Err(EncodeError::InvalidInput(
            "Invalid WAV: missing RIFF/WAVE header".to_string(),
        ));
    }

    let mut pos = 12;
    let mut fmt: Option<FmtChunk> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body + 16 > data.len() {
                    return Err(EncodeError::InvalidInput(
                        "Invalid fmt chunk size".to_string(),
                    ));
                }
                fmt = Some(FmtChunk {
                    audio_format: read_u16(data, body),
                    num_channels: read_u16(data, body + 2),
                    sample_rate: read_u32(data, body + 4),
                    bits_per_sample: read_u16(data, body + 14),
                });
            }
            b"data" => {
                let fmt = fmt.ok_or_else(|| {
                    EncodeError::InvalidInput("Invalid WAV: data before fmt chunk".to_string())
                })?;
                // 流式写出的 WAV 可能把大小写成占位值，以实际长度为准
                let data_size = chunk_size.min(data.len() - body);
                return Ok(WavLayout {
                    fmt,
                    data_start: body,
                    data_size,
                });
            }
            _ => {}
        }

        pos = body.saturating_add(chunk_size);
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos = pos.saturating_add(1);
        }
    }

    Err(EncodeError::InvalidInput(
        "Invalid WAV: missing data chunk".to_string(),
    ))
}
