// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// 熔断器配置
#[derive(Clone, Debug)]
pub struct CircuitConfig {
    /// 连续失败阈值
    pub failure_threshold: u32,
    /// 恢复超时时间
    pub recovery_timeout: Duration,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

/// 熔断器状态枚举
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BreakerState {
    /// 关闭状态（正常放行）
    Closed,
    /// 打开状态（快速失败）
    Open,
    /// 半开状态（放行一次探测调用）
    HalfOpen,
}

/// 熔断器包装的调用错误
#[derive(Error, Debug)]
pub enum BreakerError<E> {
    /// 熔断器打开，调用未执行
    #[error("Circuit breaker is open, call rejected")]
    Open,
    /// 被包装操作自身的错误
    #[error(transparent)]
    Inner(E),
}

/// 熔断器
///
/// 单个抓取会话内的显式状态对象：连续失败达到阈值后打开，
/// 冷却期结束放行一次探测调用，探测成功则关闭。
/// 每个任务尝试持有独立实例，不跨任务共享。
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitConfig,
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

impl CircuitBreaker {
    /// 创建新的熔断器实例
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            config,
            state: BreakerState::Closed,
            failure_count: 0,
            last_failure: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// 连续失败次数
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// 判断是否放行本次调用
    ///
    /// 打开状态下冷却期结束则转入半开并放行一次探测。
    pub fn is_call_permitted(&mut self) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if let Some(last_failure) = self.last_failure {
                    if last_failure.elapsed() >= self.config.recovery_timeout {
                        self.state = BreakerState::HalfOpen;
                        return true;
                    }
                }
                counter!("circuit_breaker_rejected_total").increment(1);
                false
            }
        }
    }

    /// 记录成功
    pub fn record_success(&mut self) {
        counter!("circuit_breaker_successes_total").increment(1);
        self.failure_count = 0;
        self.state = BreakerState::Closed;
    }

    /// 记录失败
    pub fn record_failure(&mut self) {
        counter!("circuit_breaker_failures_total").increment(1);
        self.failure_count += 1;
        self.last_failure = Some(Instant::now());

        match self.state {
            BreakerState::HalfOpen => {
                // Failed probe reopens immediately
                self.state = BreakerState::Open;
            }
            BreakerState::Closed => {
                if self.failure_count >= self.config.failure_threshold {
                    self.state = BreakerState::Open;
                }
            }
            BreakerState::Open => {}
        }
    }

    /// 执行受保护的操作
    ///
    /// 打开状态直接返回`BreakerError::Open`，不触发任何调用。
    pub async fn call<T, E, F, Fut>(&mut self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.is_call_permitted() {
            return Err(BreakerError::Open);
        }

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(BreakerError::Inner(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(threshold: u32, recovery_ms: u64) -> CircuitConfig {
        CircuitConfig {
            failure_threshold: threshold,
            recovery_timeout: Duration::from_millis(recovery_ms),
        }
    }

    #[tokio::test]
    async fn test_opens_after_threshold_and_rejects_without_calling() {
        let mut breaker = CircuitBreaker::new(config(3, 10_000));
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let result: Result<(), _> = breaker
                .call(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), &str>("boom")
                })
                .await;
            assert!(matches!(result, Err(BreakerError::Inner(_))));
        }
        assert_eq!(breaker.state(), BreakerState::Open);

        // Next call must be rejected without invoking the operation
        let result: Result<(), _> = breaker
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<(), &str>(())
            })
            .await;
        assert!(matches!(result, Err(BreakerError::Open)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_half_open_probe_success_closes() {
        let mut breaker = CircuitBreaker::new(config(2, 20));
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        tokio::time::sleep(Duration::from_millis(30)).await;

        // Recovery elapsed: exactly one probe allowed
        assert!(breaker.is_call_permitted());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_half_open_probe_failure_reopens() {
        let mut breaker = CircuitBreaker::new(config(2, 20));
        breaker.record_failure();
        breaker.record_failure();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(breaker.is_call_permitted());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.is_call_permitted());
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_failures() {
        let mut breaker = CircuitBreaker::new(config(3, 10_000));
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();

        // Never three in a row, stays closed
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
