//! Domain Layer - 领域层
//!
//! 纯同步逻辑，不做任何 I/O:
//! - Synthesis Context: 引擎能力描述与值对象
//! - Audio: PCM 拼接、进度估算

pub mod audio;
pub mod synthesis;

// 共享的文本分块器
mod text_chunker;

pub use text_chunker::{chunk_text, split_text, TextChunk};
