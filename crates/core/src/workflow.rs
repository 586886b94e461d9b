//! 워크플로 컨텍스트 — 시나리오 한 번의 상태 추적
//!
//! # 상태 전이
//! ```text
//! Created ──▶ Submitted ──▶ Polling ──▶ Terminal(state)
//!    │            │   │         │
//!    │            │   └─────────┼──────▶ Terminal(state)
//!    │            │             └──────▶ TimedOut
//!    └────────────┴─────────────────────▶ Failed(reason)
//! ```
//!
//! 롤백은 없습니다. 실패하거나 시간 초과된 워크플로가 만든 엔티티는 그대로 남습니다.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FreightcheckError;
use crate::role::Role;
use crate::types::{Credential, EntityRef};

/// 워크플로 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum WorkflowState {
    /// 생성 호출 진행 중
    Created,
    /// 생성/발행 완료
    Submitted,
    /// 하위 상태를 기다리는 중
    Polling,
    /// 기대한 상태를 관측함
    Terminal(String),
    /// 폴링 한도 초과
    TimedOut,
    /// 단계 실패
    Failed(String),
}

impl WorkflowState {
    /// 더 이상 전이할 수 없는 상태인지 확인합니다.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Terminal(_) | Self::TimedOut | Self::Failed(_))
    }

    /// `next`로의 전이가 허용되는지 확인합니다.
    pub fn can_transition_to(&self, next: &WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Created, Submitted)
                | (Created, Failed(_))
                | (Submitted, Polling)
                | (Submitted, Terminal(_))
                | (Submitted, Failed(_))
                | (Polling, Terminal(_))
                | (Polling, TimedOut)
                | (Polling, Failed(_))
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Submitted => f.write_str("submitted"),
            Self::Polling => f.write_str("polling"),
            Self::Terminal(state) => write!(f, "terminal({state})"),
            Self::TimedOut => f.write_str("timed_out"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// 시나리오 한 번의 실행 컨텍스트
///
/// 역할, 자격 증명, 생성된 엔티티 참조, 상관관계 키, 현재 상태를 담습니다.
/// 시나리오 밖으로 저장되지 않습니다.
#[derive(Debug)]
pub struct WorkflowContext {
    name: String,
    role: Role,
    credential: Credential,
    correlation_key: String,
    entities: Vec<EntityRef>,
    state: WorkflowState,
    started: Instant,
}

impl WorkflowContext {
    /// `Created` 상태의 컨텍스트를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        role: Role,
        credential: Credential,
        correlation_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            credential,
            correlation_key: correlation_key.into(),
            entities: Vec::new(),
            state: WorkflowState::Created,
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn correlation_key(&self) -> &str {
        &self.correlation_key
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// 상관관계 키를 바꿉니다 (예: 생성 후 서버가 부여한 요청 번호).
    pub fn set_correlation_key(&mut self, key: impl Into<String>) {
        self.correlation_key = key.into();
    }

    /// 생성된 엔티티 참조를 기록합니다.
    pub fn record(&mut self, entity: EntityRef) {
        self.entities.push(entity);
    }

    /// 여러 참조를 기록합니다.
    pub fn record_all(&mut self, entities: impl IntoIterator<Item = EntityRef>) {
        self.entities.extend(entities);
    }

    /// 상태를 전이합니다.
    ///
    /// 허용되지 않는 전이는 무시하고 `false`를 반환합니다.
    pub fn advance(&mut self, next: WorkflowState) -> bool {
        if !self.state.can_transition_to(&next) {
            warn!(
                workflow = %self.name,
                from = %self.state,
                to = %next,
                "ignoring invalid workflow transition"
            );
            return false;
        }
        info!(workflow = %self.name, from = %self.state, to = %next, "workflow transition");
        self.state = next;
        true
    }

    /// 생성/발행 완료
    pub fn submitted(&mut self) -> bool {
        self.advance(WorkflowState::Submitted)
    }

    /// 폴링 시작
    pub fn polling(&mut self) -> bool {
        self.advance(WorkflowState::Polling)
    }

    /// 기대한 최종 상태 관측
    pub fn finish(&mut self, state: impl Into<String>) -> bool {
        self.advance(WorkflowState::Terminal(state.into()))
    }

    /// 에러를 상태에 반영하고 그대로 돌려줍니다.
    ///
    /// 폴링 시간 초과는 `TimedOut`, 그 외는 `Failed`가 됩니다.
    pub fn fail(&mut self, err: FreightcheckError) -> FreightcheckError {
        let next = match &err {
            FreightcheckError::PollTimeout { .. } => WorkflowState::TimedOut,
            other => WorkflowState::Failed(other.to_string()),
        };
        if !self.advance(next.clone()) && !self.state.is_finished() {
            // 전이 규칙과 무관하게 실패는 항상 기록
            self.state = next;
        }
        err
    }

    /// 시작 후 경과 시간 (밀리초)
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// 실행 보고서를 만듭니다.
    pub fn report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            role: self.role,
            correlation_key: self.correlation_key.clone(),
            entities: self.entities.clone(),
            final_state: self.state.clone(),
            elapsed_ms: self.elapsed_ms(),
        }
    }
}

/// 시나리오 실행 보고서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// 시나리오 이름
    pub name: String,
    /// 실행 역할
    pub role: Role,
    /// 상관관계 키 (송장 번호, 요청 번호 등)
    pub correlation_key: String,
    /// 생성된 엔티티
    pub entities: Vec<EntityRef>,
    /// 최종 상태
    pub final_state: WorkflowState,
    /// 경과 시간 (밀리초)
    pub elapsed_ms: u64,
}
