//! 指数退避重试
//!
//! 第 n 次失败后等待 `base_delay * multiplier^(n-1)`，最后一次失败后不再等待。
//! 等待期间可以被取消令牌打断。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::synthesis::EngineProfile;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次），至少为 1
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: 2,
        }
    }

    pub fn from_profile(profile: &EngineProfile) -> Self {
        Self::new(profile.max_attempts, profile.base_delay)
    }

    /// 第 `attempt` 次失败后的等待（attempt 从 1 开始）
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// 重试失败原因
#[derive(Debug, PartialEq)]
pub enum RetryFailure<E> {
    /// 预算耗尽，保留最后一次错误
    Exhausted(E),
    /// 错误不可重试，立即放弃
    Fatal(E),
    Cancelled,
}

/// 重试结果
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, RetryFailure<E>>,
    /// 实际发起的尝试次数
    pub attempts: u32,
}

/// 带指数退避的重试
///
/// `operation` 接收当前尝试序号（从 1 开始）。
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return RetryOutcome {
                result: Err(RetryFailure::Cancelled),
                attempts: attempt,
            };
        }

        attempt += 1;
        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Succeeded after retry");
                }
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(e) => e,
        };

        if !is_retryable(&error) {
            warn!(attempt, error = %error, "Non-retryable failure");
            return RetryOutcome {
                result: Err(RetryFailure::Fatal(error)),
                attempts: attempt,
            };
        }

        if attempt >= policy.max_attempts {
            warn!(
                attempt,
                max_attempts = policy.max_attempts,
                error = %error,
                "Retry budget exhausted"
            );
            return RetryOutcome {
                result: Err(RetryFailure::Exhausted(error)),
                attempts: attempt,
            };
        }

        let delay = policy.delay_after(attempt);
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Attempt failed, backing off"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                return RetryOutcome {
                    result: Err(RetryFailure::Cancelled),
                    attempts: attempt,
                };
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
