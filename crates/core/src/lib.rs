//! freightcheck 공통 크레이트
//!
//! 물류 REST API 종단 간 검증 도구의 핵심 부품을 제공합니다.
//!
//! - [`auth::CredentialCache`]: 역할별 자격 증명 캐시 (역할당 로그인 1회)
//! - [`chain::create_dependent_chain`]: 단계 간 식별자 전달
//! - [`poll::poll_until`]: 최종적 일관성 상태 대기
//! - [`workflow::WorkflowContext`]: 시나리오 한 번의 상태 추적
//!
//! 원격 API는 [`transport::Transport`] trait 뒤에 있으며, 테스트에서는
//! `mock` 기능의 `MockTransport`로 대체됩니다.

pub mod auth;
pub mod chain;
pub mod config;
pub mod error;
pub mod poll;
pub mod role;
pub mod sequence;
pub mod session;
pub mod transport;
pub mod types;
pub mod workflow;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{AuthError, ConfigError, CorrelationError, FreightcheckError};

// 설정
pub use config::FreightcheckConfig;

// 역할 / 도메인 타입
pub use role::{Role, RoleDirectory, RoleProfile};
pub use types::{Credential, EntityKind, EntityRef, RefField};

// 전송 계층 / 세션
pub use auth::CredentialCache;
pub use session::ApiSession;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

// 워크플로
pub use chain::{Binding, StepSpec, create_dependent_chain};
pub use poll::{Backoff, PollError, PollPolicy, poll_until};
pub use sequence::TitleSequence;
pub use workflow::{ScenarioReport, WorkflowContext, WorkflowState};
