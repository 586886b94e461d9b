//! 에러 타입 — 도메인별 에러 정의
//!
//! 시나리오 하나를 실패시키는 모든 원인은 [`FreightcheckError`]로 모입니다.
//! 실패한 단계의 HTTP 상태 코드와 응답 본문은 가공 없이 그대로 보존됩니다.

/// freightcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum FreightcheckError {
    /// 설정 관련 에러 (역할 자격 증명 누락 포함)
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그인 실패
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// 인증 이외 호출의 non-2xx 응답
    #[error("http error: {method} {path} returned {status}: {body}")]
    Http {
        /// 요청 메서드
        method: String,
        /// 요청 경로
        path: String,
        /// 응답 상태 코드
        status: u16,
        /// 응답 본문 (원문 그대로)
        body: String,
    },

    /// 응답 형태가 기대한 스키마와 다름
    #[error("decode error: {path}: {reason}")]
    Decode {
        /// 요청 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 단계 간 식별자 전달 실패
    #[error("correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    /// 폴링 시간 초과
    #[error("poll timed out after {attempts} attempt(s) in {elapsed_ms}ms, last observed: {last_observed}")]
    PollTimeout {
        /// 시도 횟수
        attempts: u32,
        /// 경과 시간 (밀리초)
        elapsed_ms: u64,
        /// 마지막으로 관측된 값 (진단용)
        last_observed: String,
    },

    /// 실행 취소
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// 연결/타임아웃 등 전송 계층 실패
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 역할의 이메일/비밀번호가 비어 있음
    #[error("credentials for role '{role}' not found (set {env_prefix}_EMAIL and {env_prefix}_PASSWORD)")]
    MissingCredentials { role: String, env_prefix: String },

    /// 알 수 없는 역할 키
    #[error("unknown role '{0}' (expected one of: lkz, lke, lkp)")]
    UnknownRole(String),
}

/// 인증 에러
///
/// 세션 동안 캐시되므로 `Clone`을 구현합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// 로그인 엔드포인트가 non-2xx를 반환
    #[error("login for role '{role}' rejected with status {status}: {body}")]
    Rejected {
        role: String,
        status: u16,
        body: String,
    },

    /// 로그인 응답에서 token/role을 읽을 수 없음
    #[error("login response for role '{role}' is malformed: {reason}")]
    MalformedResponse { role: String, reason: String },

    /// 로그인 요청 자체가 전송되지 못함
    #[error("login request for role '{role}' failed: {reason}")]
    Unreachable { role: String, reason: String },
}

/// 워크플로 상관관계 에러
#[derive(Debug, thiserror::Error)]
pub enum CorrelationError {
    /// 응답에 내부 ID가 없음
    #[error("step '{step}' response has no usable '{field}'")]
    MissingInternalId { step: String, field: String },

    /// 응답에 외부 ID가 없고 대체값도 지정되지 않음
    #[error("step '{step}' response has no '{field}' and no fallback was supplied")]
    MissingExternalId { step: String, field: String },

    /// 바인딩이 아직 실행되지 않은 단계를 참조
    #[error("step '{step}' depends on step #{source_index} which has not run yet")]
    UnresolvedDependency { step: String, source_index: usize },

    /// 바인딩 대상 JSON 위치가 페이로드에 없음
    #[error("step '{step}' payload has no binding target '{pointer}'")]
    MissingTarget { step: String, pointer: String },

    /// 일괄 생성 응답에서 항목 하나가 거부됨
    #[error("'{step}' item #{index} was rejected with status '{status}': {errors}")]
    ItemRejected {
        step: String,
        index: usize,
        status: String,
        errors: String,
    },

    /// 응답 목록에서 기대한 엔티티를 찾지 못함
    #[error("{entity} '{key}' not found in {source_name}")]
    NotFound {
        entity: String,
        key: String,
        source_name: String,
    },
}
