//! 제목 시퀀스
//!
//! 화물 단위 제목(`API-00042`)을 만드는 원자적 카운터입니다.
//! 생성자에 주입되므로 테스트마다 독립된 시퀀스를 쓸 수 있습니다.

use std::sync::atomic::{AtomicU64, Ordering};

/// 접두사 + 5자리 일련번호 제목 생성기
#[derive(Debug)]
pub struct TitleSequence {
    prefix: String,
    counter: AtomicU64,
}

impl TitleSequence {
    /// 기본 접두사 `API`
    pub const DEFAULT_PREFIX: &'static str = "API";

    /// 접두사를 지정해 생성합니다. 첫 값은 1입니다.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// 시작 번호를 지정해 생성합니다.
    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(first),
        }
    }

    /// 다음 제목을 반환합니다.
    pub fn next_title(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n:05}", self.prefix)
    }
}

impl Default for TitleSequence {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}
