//! 역할별 자격 증명 캐시
//!
//! [`CredentialCache`]는 세션당 한 번 생성되어 `Arc`로 공유됩니다.
//! 역할마다 로그인은 최대 한 번만 일어납니다.
//!
//! # 동작 규칙
//! - 이메일/비밀번호가 비어 있으면 네트워크 호출 없이 `ConfigError`
//! - 같은 역할의 동시 첫 요청은 하나의 로그인 호출을 공유 (single-flight)
//! - 결과는 성공/실패 모두 세션 끝까지 유지 (TTL, 갱신 없음)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

use crate::config::FreightcheckConfig;
use crate::error::{AuthError, FreightcheckError};
use crate::role::{Role, RoleDirectory};
use crate::session::ApiSession;
use crate::transport::{ApiRequest, Transport};
use crate::types::Credential;

/// 로그인 엔드포인트
pub const LOGIN_PATH: &str = "/user/login";

type Slot = Arc<OnceCell<Result<Credential, AuthError>>>;

/// 역할별 자격 증명 캐시
pub struct CredentialCache<T: Transport> {
    transport: Arc<T>,
    roles: RoleDirectory,
    request_timeout: Duration,
    long_request_timeout: Duration,
    slots: Mutex<HashMap<Role, Slot>>,
}

impl<T: Transport> CredentialCache<T> {
    /// 새 캐시를 생성합니다.
    pub fn new(transport: Arc<T>, roles: RoleDirectory) -> Self {
        Self {
            transport,
            roles,
            request_timeout: ApiRequest::DEFAULT_TIMEOUT,
            long_request_timeout: ApiRequest::DEFAULT_TIMEOUT * 3,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// 설정의 역할 목록과 타임아웃으로 캐시를 생성합니다.
    pub fn from_config(transport: Arc<T>, config: &FreightcheckConfig) -> Self {
        let mut cache = Self::new(transport, config.roles.clone());
        cache.request_timeout = config.request_timeout();
        cache.long_request_timeout = config.long_request_timeout();
        cache
    }

    /// 공유 전송 계층
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// 역할의 자격 증명을 반환합니다.
    ///
    /// # Errors
    ///
    /// - `FreightcheckError::Config`: 역할의 이메일/비밀번호가 비어 있음
    /// - `FreightcheckError::Auth`: 로그인 실패 (이후 호출에서도 같은 에러)
    pub async fn get_credential(&self, role: Role) -> Result<Credential, FreightcheckError> {
        let (email, password) = self.roles.credentials(role)?;

        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(role).or_default())
        };

        let result = slot
            .get_or_init(|| self.login(role, email, password))
            .await;

        result.clone().map_err(FreightcheckError::from)
    }

    /// 역할로 인증된 세션을 반환합니다.
    pub async fn session(&self, role: Role) -> Result<ApiSession<T>, FreightcheckError> {
        let credential = self.get_credential(role).await?;
        Ok(
            ApiSession::new(Arc::clone(&self.transport), role, credential)
                .with_timeouts(self.request_timeout, self.long_request_timeout),
        )
    }

    /// 역할의 로그인 결과가 이미 캐시되어 있는지 확인합니다.
    pub async fn is_cached(&self, role: Role) -> bool {
        self.slots
            .lock()
            .await
            .get(&role)
            .is_some_and(|slot| slot.initialized())
    }

    async fn login(&self, role: Role, email: &str, password: &str) -> Result<Credential, AuthError> {
        info!(role = %role, "logging in");

        let request = ApiRequest::post(
            LOGIN_PATH,
            serde_json::json!({
                "username": email,
                "password": password,
            }),
        )
        .with_timeout(self.request_timeout);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Unreachable {
                role: role.key().to_owned(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            warn!(role = %role, status = response.status, "login rejected");
            return Err(AuthError::Rejected {
                role: role.key().to_owned(),
                status: response.status,
                body: response.body,
            });
        }

        let credential: Credential =
            serde_json::from_str(&response.body).map_err(|e| AuthError::MalformedResponse {
                role: role.key().to_owned(),
                reason: e.to_string(),
            })?;

        if credential.token.trim().is_empty() {
            return Err(AuthError::MalformedResponse {
                role: role.key().to_owned(),
                reason: "token is empty".to_owned(),
            });
        }

        info!(role = %role, role_id = credential.role_id, "login succeeded");
        Ok(credential)
    }
}
