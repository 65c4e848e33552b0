//! 合成进度估算
//!
//! 总耗时 = 块数 * 单块耗时 + (块数 - 1) * 块间耗时，
//! 块数 = ceil(字符数 / 引擎分块大小)。常数来自经验标定。

use serde::Serialize;

use crate::domain::synthesis::{EngineKind, EngineProfile};

/// 一次合成任务的耗时估算，任务开始时计算一次
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEstimate {
    pub engine: EngineKind,
    pub character_count: usize,
    pub chunk_count: usize,
    pub estimated_total_secs: f64,
}

impl ProgressEstimate {
    pub fn new(character_count: usize, profile: &EngineProfile) -> Self {
        let chunk_count = if profile.chunk_size == 0 {
            0
        } else {
            character_count.div_ceil(profile.chunk_size)
        };
        let estimated_total_secs = chunk_count as f64 * profile.seconds_per_chunk
            + chunk_count.saturating_sub(1) as f64 * profile.estimated_inter_chunk_secs;

        Self {
            engine: profile.kind,
            character_count,
            chunk_count,
            estimated_total_secs,
        }
    }

    /// 估算总时长（秒，向上取整）
    pub fn total_secs(&self) -> u64 {
        self.estimated_total_secs.ceil() as u64
    }

    /// 生成进度快照
    ///
    /// - remaining = max(0, estimated - elapsed)
    /// - percent = min(100, floor(elapsed / estimated * 100))，估算为 0 时为 100
    pub fn snapshot(&self, elapsed_secs: u64, chunk_index: usize, chunk_count: usize) -> ProgressSnapshot {
        let remaining_secs = (self.estimated_total_secs - elapsed_secs as f64).max(0.0).ceil() as u64;
        let percent = if self.estimated_total_secs <= 0.0 {
            100
        } else {
            ((elapsed_secs as f64 / self.estimated_total_secs) * 100.0)
                .floor()
                .min(100.0) as u8
        };

        let status = if chunk_count > 0 && chunk_index >= chunk_count {
            format!(
                "Audio generated: {} chunks in {}",
                chunk_count,
                format_duration(elapsed_secs)
            )
        } else if remaining_secs == 0 {
            format!(
                "Generating audio... chunk {}/{} · {} elapsed · finishing up",
                (chunk_index + 1).min(chunk_count.max(1)),
                chunk_count,
                format_duration(elapsed_secs)
            )
        } else {
            format!(
                "Generating audio... chunk {}/{} · {} elapsed · ~{} remaining ({}%)",
                (chunk_index + 1).min(chunk_count.max(1)),
                chunk_count,
                format_duration(elapsed_secs),
                format_duration(remaining_secs),
                percent
            )
        };

        ProgressSnapshot {
            elapsed_secs,
            estimated_total_secs: self.total_secs(),
            remaining_secs,
            percent,
            chunk_index,
            chunk_count,
            status,
        }
    }
}

/// 进度快照（只读，发给订阅方）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub elapsed_secs: u64,
    pub estimated_total_secs: u64,
    pub remaining_secs: u64,
    pub percent: u8,
    /// 已完成的块数，也就是正在合成的块序号
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub status: String,
}

/// 人类可读时长: "45s" / "3m 07s" / "1h 02m"
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_estimate() {
        let estimate = ProgressEstimate::new(10_000, &EngineProfile::premium());
        assert_eq!(estimate.chunk_count, 4);
        assert_eq!(estimate.estimated_total_secs, 4.0 * 20.0 + 3.0 * 9.0);
        assert_eq!(estimate.total_secs(), 107);
    }

    #[test]
    fn test_fast_estimate() {
        let estimate = ProgressEstimate::new(9_500, &EngineProfile::fast());
        assert_eq!(estimate.chunk_count, 3);
        assert_eq!(estimate.estimated_total_secs, 3.0 * 5.0 + 2.0 * 0.5);
    }

    #[test]
    fn test_empty_text_estimates_zero() {
        let estimate = ProgressEstimate::new(0, &EngineProfile::fast());
        assert_eq!(estimate.chunk_count, 0);
        assert_eq!(estimate.estimated_total_secs, 0.0);
        assert_eq!(estimate.snapshot(0, 0, 0).percent, 100);
    }

    #[test]
    fn test_snapshot_monotonic_and_clamped() {
        let estimate = ProgressEstimate::new(9_000, &EngineProfile::premium());
        let mut last_remaining = u64::MAX;
        let mut last_percent = 0u8;

        for elapsed in 0..300 {
            let snap = estimate.snapshot(elapsed, 0, 3);
            assert!(snap.remaining_secs <= last_remaining);
            assert!(snap.percent >= last_percent);
            assert!(snap.percent <= 100);
            last_remaining = snap.remaining_secs;
            last_percent = snap.percent;
        }
        assert_eq!(last_remaining, 0);
        assert_eq!(last_percent, 100);
    }

    #[test]
    fn test_snapshot_halfway() {
        let estimate = ProgressEstimate::new(8_000, &EngineProfile::fast());
        // 2 块: 2 * 5 + 1 * 0.5 = 10.5s
        let snap = estimate.snapshot(5, 1, 2);
        assert_eq!(snap.percent, 47);
        assert_eq!(snap.remaining_secs, 6);
        assert!(snap.status.contains("chunk 2/2"));
    }

    #[test]
    fn test_status_after_completion() {
        let estimate = ProgressEstimate::new(100, &EngineProfile::fast());
        let snap = estimate.snapshot(4, 1, 1);
        assert_eq!(snap.status, "Audio generated: 1 chunks in 4s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(187), "3m 07s");
        assert_eq!(format_duration(3720), "1h 02m");
    }
}
