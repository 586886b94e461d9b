//! 의존 생성 체인 — 단계 간 식별자 전달
//!
//! 각 단계는 엔티티 하나를 생성하고, 이전 단계가 만든 참조의 내부/외부 ID를
//! 자기 페이로드의 JSON 위치에 채워 넣은 뒤 호출합니다.
//!
//! ```text
//! step 0: address       → {"id": 10, "externalId": "A1"}
//!                                              │
//! step 1: cargo place   payload["/departurePointExternalId"] = "A1"
//! ```
//!
//! 첫 번째로 실패한 단계에서 즉시 중단합니다.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{CorrelationError, FreightcheckError};
use crate::session::ApiSession;
use crate::transport::Transport;
use crate::types::{EntityKind, EntityRef, RefField};

/// 이전 단계 참조의 식별자를 현재 페이로드로 복사하는 규칙
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// 참조할 단계의 인덱스
    pub from_step: usize,
    /// 복사할 식별자
    pub field: RefField,
    /// 현재 페이로드의 대상 위치 (JSON Pointer, RFC 6901)
    pub pointer: String,
}

impl Binding {
    /// 내부 ID 바인딩
    pub fn internal_id(from_step: usize, pointer: impl Into<String>) -> Self {
        Self {
            from_step,
            field: RefField::InternalId,
            pointer: pointer.into(),
        }
    }

    /// 외부 ID 바인딩
    pub fn external_id(from_step: usize, pointer: impl Into<String>) -> Self {
        Self {
            from_step,
            field: RefField::ExternalId,
            pointer: pointer.into(),
        }
    }
}

/// 체인의 한 단계
#[derive(Debug, Clone)]
pub struct StepSpec {
    /// 로그/에러용 단계 이름
    pub name: String,
    /// 생성되는 엔티티 종류
    pub kind: EntityKind,
    /// 호출할 경로 (`POST`)
    pub endpoint: String,
    /// 요청 페이로드
    pub payload: Value,
    /// 이전 단계에서 가져올 식별자
    pub bindings: Vec<Binding>,
    /// 응답에 외부 ID가 없을 때 사용할 값
    pub fallback_external_id: Option<String>,
}

impl StepSpec {
    /// 바인딩 없는 단계를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        kind: EntityKind,
        endpoint: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            endpoint: endpoint.into(),
            payload,
            bindings: Vec::new(),
            fallback_external_id: None,
        }
    }

    /// 바인딩을 추가합니다.
    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// 외부 ID 대체값을 지정합니다.
    pub fn with_fallback(mut self, external_id: impl Into<String>) -> Self {
        self.fallback_external_id = Some(external_id.into());
        self
    }

    /// 바인딩을 적용한 페이로드를 만듭니다.
    ///
    /// `refs`는 이 단계 이전에 생성된 참조들입니다.
    pub fn resolve_payload(&self, refs: &[EntityRef]) -> Result<Value, CorrelationError> {
        let mut payload = self.payload.clone();
        for binding in &self.bindings {
            let source = refs
                .get(binding.from_step)
                .ok_or_else(|| CorrelationError::UnresolvedDependency {
                    step: self.name.clone(),
                    source_index: binding.from_step,
                })?;
            let target = payload.pointer_mut(&binding.pointer).ok_or_else(|| {
                CorrelationError::MissingTarget {
                    step: self.name.clone(),
                    pointer: binding.pointer.clone(),
                }
            })?;
            *target = source.field_value(binding.field);
        }
        Ok(payload)
    }

    /// 생성 응답에서 엔티티 참조를 읽습니다.
    pub fn extract_ref(&self, response: &Value) -> Result<EntityRef, CorrelationError> {
        extract_ref(
            &self.name,
            self.kind,
            response,
            self.fallback_external_id.as_deref(),
        )
    }
}

/// 생성 응답에서 종류별 규칙으로 `(내부 ID, 외부 ID)`를 읽습니다.
///
/// 외부 ID가 없거나 `null`이거나 빈 문자열이면 `fallback`을 사용합니다.
pub fn extract_ref(
    step: &str,
    kind: EntityKind,
    response: &Value,
    fallback: Option<&str>,
) -> Result<EntityRef, CorrelationError> {
    let id_field = kind.internal_id_field();
    let internal_id = match response.get(id_field) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| CorrelationError::MissingInternalId {
        step: step.to_owned(),
        field: id_field.to_owned(),
    })?;

    let ext_field = kind.external_id_field();
    let external_id = match response.get(ext_field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .or_else(|| fallback.map(str::to_owned))
    .ok_or_else(|| CorrelationError::MissingExternalId {
        step: step.to_owned(),
        field: ext_field.to_owned(),
    })?;

    Ok(EntityRef {
        kind,
        internal_id,
        external_id,
    })
}

/// 단계들을 순서대로 실행하고 생성된 참조를 반환합니다.
///
/// # Errors
///
/// 첫 번째로 실패한 단계의 에러 (`Http`, `Decode`, `Correlation` 등)
pub async fn create_dependent_chain<T: Transport>(
    session: &ApiSession<T>,
    steps: &[StepSpec],
) -> Result<Vec<EntityRef>, FreightcheckError> {
    let mut refs: Vec<EntityRef> = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        let payload = step.resolve_payload(&refs)?;
        debug!(step = %step.name, index, endpoint = %step.endpoint, "running chain step");

        let response: Value = session.post_json(&step.endpoint, &payload).await?;
        let reference = step.extract_ref(&response)?;

        info!(step = %step.name, entity = %reference, "chain step created entity");
        refs.push(reference);
    }

    Ok(refs)
}
