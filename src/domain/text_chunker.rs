//! 文本分块器
//!
//! 将任意长度的故事文本切分为不超过引擎上限的块，优先在句号或换行处切分。
//!
//! 不变量:
//! - 按顺序拼接所有块 == 原文（不丢字、不重复、不乱序）
//! - 每块字符数 <= max_chunk_chars
//! - 仅当原文为空时才会得到空列表，不会产生空块

use serde::Serialize;

use super::synthesis::SynthesisDomainError;

/// 句末分隔符（切分后保留在前一块末尾）
#[inline]
fn is_split_terminator(byte: u8) -> bool {
    matches!(byte, b'.' | b'\n')
}

/// 分块后的文本片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    /// 从 0 开始的块序号
    pub index: usize,
    pub content: String,
}

impl TextChunk {
    /// 字符数（Unicode scalar）
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// 切分文本
///
/// 切分策略：
/// 1. 剩余文本不超过 `max_chunk_chars` 时整体作为最后一块
/// 2. 否则取 `max_chunk_chars` 个字符的窗口，找最后一个 `.` 或 `\n`
/// 3. 该位置落在窗口前半段（或不存在）时硬切在 `max_chunk_chars`，否则切在分隔符之后
///
/// 长度按字符计算，而不是字节。
pub fn split_text(text: &str, max_chunk_chars: usize) -> Result<Vec<String>, SynthesisDomainError> {
    if max_chunk_chars == 0 {
        return Err(SynthesisDomainError::InvalidChunkSize(max_chunk_chars));
    }

    // 字符序号 -> 字节偏移，末尾追加 text.len() 便于取切片
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    let mut chunks = Vec::with_capacity(total_chars / max_chunk_chars + 1);
    let mut start = 0;

    while total_chars - start > max_chunk_chars {
        let window_start = bounds[start];
        let window_end = bounds[start + max_chunk_chars];
        let window = &text.as_bytes()[window_start..window_end];

        let split_index = window
            .iter()
            .rposition(|b| is_split_terminator(*b))
            .and_then(|byte_pos| bounds.binary_search(&(window_start + byte_pos)).ok())
            .map(|char_idx| char_idx - start);

        let cut = match split_index {
            Some(idx) if 2 * idx >= max_chunk_chars => idx + 1,
            _ => max_chunk_chars,
        };

        chunks.push(text[window_start..bounds[start + cut]].to_string());
        start += cut;
    }

    if start < total_chars {
        chunks.push(text[bounds[start]..].to_string());
    }

    tracing::debug!(
        total_chars,
        max_chunk_chars,
        chunk_count = chunks.len(),
        "Text split into chunks"
    );

    Ok(chunks)
}

/// 切分文本并附加序号
pub fn chunk_text(text: &str, max_chunk_chars: usize) -> Result<Vec<TextChunk>, SynthesisDomainError> {
    Ok(split_text(text, max_chunk_chars)?
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextChunk { index, content })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_text("", 100).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split_text("Once upon a time.", 100).unwrap();
        assert_eq!(chunks, vec!["Once upon a time.".to_string()]);
    }

    #[test]
    fn test_text_exactly_max_is_single_chunk() {
        let text = "a".repeat(50);
        let chunks = split_text(&text, 50).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            split_text("abc", 0),
            Err(SynthesisDomainError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_splits_after_last_period_in_window() {
        // 窗口 [0, 10): "aaaaaaa.bb"，句号在 7 (>= 5)
        let text = "aaaaaaa.bbcccc";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(chunks[0], "aaaaaaa.");
        assert_eq!(chunks[1], "bbcccc");
    }

    #[test]
    fn test_newline_counts_as_terminator() {
        let text = "aaaaaa\nbbbbbbbbb";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(chunks[0], "aaaaaa\n");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_uses_later_of_period_and_newline() {
        let text = "aaaaa.a\nbbbbbbbbbb";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(chunks[0], "aaaaa.a\n");
    }

    #[test]
    fn test_terminator_in_first_half_is_rejected() {
        // 句号在 2 (< 5)，应硬切在 10
        let text = "aa.aaaaaaaaaaaaa";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(char_len(&chunks[0]), 10);
        assert_eq!(chunks[0], "aa.aaaaaaa");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_terminator_exactly_at_half_is_accepted() {
        // 句号在 5，5 * 2 >= 10
        let text = "aaaaa.aaaaaaaaaa";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(chunks[0], "aaaaa.");
    }

    #[test]
    fn test_hard_cut_without_terminators() {
        let text = "x".repeat(25);
        let chunks = split_text(&text, 10).unwrap();
        let lens: Vec<usize> = chunks.iter().map(|c| char_len(c)).collect();
        assert_eq!(lens, vec![10, 10, 5]);
    }

    #[test]
    fn test_multibyte_characters_counted_as_chars() {
        let text = "éééééééé.éééééé";
        let chunks = split_text(text, 10).unwrap();
        assert_eq!(chunks[0], "éééééééé.");
        assert_eq!(chunks[1], "éééééé");
        for chunk in &chunks {
            assert!(char_len(chunk) <= 10);
        }
    }

    #[test]
    fn test_round_trip_and_bound_on_prose() {
        let paragraph = "The lighthouse keeper counted the ships. Some nights none came.\n\
                         Others brought storms, and the lamp burned until dawn. ";
        let text = paragraph.repeat(120);

        for max in [17usize, 64, 100, 333, 3000, 4000] {
            let chunks = split_text(&text, max).unwrap();
            assert_eq!(chunks.concat(), text, "round trip failed for max={max}");
            for chunk in &chunks {
                assert!(!chunk.is_empty());
                assert!(char_len(chunk) <= max);
            }
        }
    }

    #[test]
    fn test_full_window_chunks_end_at_terminator_or_are_full() {
        let text = "Short one. A much longer sentence follows here.\nTail".repeat(40);
        let max = 30;
        let chunks = split_text(&text, max).unwrap();

        for chunk in &chunks[..chunks.len() - 1] {
            let ends_at_terminator = chunk.ends_with('.') || chunk.ends_with('\n');
            assert!(ends_at_terminator || char_len(chunk) == max);
            if ends_at_terminator {
                assert!(2 * (char_len(chunk) - 1) >= max);
            }
        }
    }

    #[test]
    fn test_chunk_text_assigns_indices() {
        let chunks = chunk_text(&"y".repeat(21), 10).unwrap();
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(chunks[2].char_count(), 1);
    }

    #[test]
    fn test_story_of_9500_chars_with_fast_chunk_size() {
        let text = "z".repeat(9500);
        let chunks = split_text(&text, 4000).unwrap();
        let lens: Vec<usize> = chunks.iter().map(|c| char_len(c)).collect();
        assert_eq!(lens, vec![4000, 4000, 1500]);
    }
}
