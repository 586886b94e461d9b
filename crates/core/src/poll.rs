//! 폴링 — 최종적 일관성 상태를 기다리는 단일 헬퍼
//!
//! [`poll_until`]은 `fetch`를 반복 호출하며 조건을 만족하는 첫 결과를
//! 반환합니다. 시나리오마다 흩어져 있던 고정 sleep 재시도 루프를 대체합니다.
//!
//! # 동작 규칙
//! - 최소 1회는 호출합니다.
//! - 조건을 만족하면 즉시 반환하고 더 호출하지 않습니다.
//! - 타임아웃이 지난 뒤에는 새 호출을 시작하지 않습니다.
//! - `fetch` 실패는 재시도 없이 즉시 전파됩니다.
//! - [`CancellationToken`]이 취소되면 대기/호출 도중에도 즉시 멈춥니다.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::FreightcheckError;

/// 시도 간 대기 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// 매번 같은 간격
    Fixed,
    /// 배수로 늘어나되 `max`에서 멈춤
    Exponential {
        /// 배수
        factor: u32,
        /// 간격 상한
        max: Duration,
    },
}

impl Backoff {
    /// 현재 간격 다음의 간격을 계산합니다.
    pub fn next_delay(&self, current: Duration) -> Duration {
        match self {
            Self::Fixed => current,
            Self::Exponential { factor, max } => current.saturating_mul(*factor).min(*max),
        }
    }
}

/// 폴링 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// 전체 대기 한도
    pub timeout: Duration,
    /// 첫 대기 간격
    pub interval: Duration,
    /// 간격 증가 방식
    pub backoff: Backoff,
}

impl PollPolicy {
    /// 고정 간격 정책을 생성합니다.
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            backoff: Backoff::Fixed,
        }
    }

    /// 백오프 방식을 지정합니다.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Duration::from_secs(1))
    }
}

/// 폴링 실패
#[derive(Debug, thiserror::Error)]
pub enum PollError<T> {
    /// 한도 안에 조건을 만족하지 못함
    #[error("condition not met after {attempts} attempt(s) in {elapsed:?}")]
    TimedOut {
        /// 시도 횟수
        attempts: u32,
        /// 경과 시간
        elapsed: Duration,
        /// 마지막으로 관측된 값
        last: T,
    },

    /// 취소됨
    #[error("polling cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// 시도 횟수
        attempts: u32,
        /// 마지막으로 관측된 값 (첫 시도 전이면 없음)
        last: Option<T>,
    },

    /// `fetch` 실패
    #[error(transparent)]
    Fetch(#[from] FreightcheckError),
}

impl<T: Serialize> From<PollError<T>> for FreightcheckError {
    fn from(err: PollError<T>) -> Self {
        match err {
            PollError::TimedOut {
                attempts,
                elapsed,
                last,
            } => FreightcheckError::PollTimeout {
                attempts,
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                last_observed: describe(&last),
            },
            PollError::Cancelled { attempts, last } => FreightcheckError::Cancelled(match last {
                Some(last) => format!(
                    "polling stopped after {attempts} attempt(s), last observed: {}",
                    describe(&last)
                ),
                None => "polling stopped before the first attempt".to_owned(),
            }),
            PollError::Fetch(e) => e,
        }
    }
}

fn describe<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

/// 조건을 만족하는 첫 결과가 나올 때까지 `fetch`를 반복합니다.
///
/// # Errors
///
/// - [`PollError::TimedOut`]: `policy.timeout` 안에 조건을 만족하지 못함
/// - [`PollError::Cancelled`]: `cancel`이 취소됨
/// - [`PollError::Fetch`]: `fetch`가 실패함
pub async fn poll_until<T, F, Fut, P>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut fetch: F,
    mut predicate: P,
) -> Result<T, PollError<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FreightcheckError>>,
    P: FnMut(&T) -> bool,
{
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let mut delay = policy.interval;
    let mut attempts: u32 = 0;
    let mut last: Option<T> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled { attempts, last });
        }

        attempts += 1;
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts, last });
            }
            result = fetch() => result?,
        };

        if predicate(&value) {
            debug!(attempts, elapsed_ms = started.elapsed().as_millis() as u64, "poll condition met");
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::TimedOut {
                attempts,
                elapsed: now - started,
                last: value,
            });
        }

        let wait = delay.min(deadline - now);
        debug!(attempts, wait_ms = wait.as_millis() as u64, "poll condition not met, waiting");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts, last: Some(value) });
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::TimedOut {
                attempts,
                elapsed: now - started,
                last: value,
            });
        }

        last = Some(value);
        delay = policy.backoff.next_delay(delay);
    }
}
