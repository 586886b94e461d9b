//! 인증된 API 세션
//!
//! [`ApiSession`]은 한 역할의 자격 증명을 모든 요청의 `Authorization`
//! 헤더에 붙이고, non-2xx 응답을 `FreightcheckError::Http`로 바꿉니다.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FreightcheckError;
use crate::role::Role;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::types::Credential;

/// 한 역할로 인증된 세션
pub struct ApiSession<T: Transport> {
    transport: Arc<T>,
    role: Role,
    credential: Credential,
    timeout: Duration,
    long_timeout: Duration,
}

impl<T: Transport> Clone for ApiSession<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            role: self.role,
            credential: self.credential.clone(),
            timeout: self.timeout,
            long_timeout: self.long_timeout,
        }
    }
}

impl<T: Transport> ApiSession<T> {
    /// 새 세션을 생성합니다.
    pub fn new(transport: Arc<T>, role: Role, credential: Credential) -> Self {
        Self {
            transport,
            role,
            credential,
            timeout: ApiRequest::DEFAULT_TIMEOUT,
            long_timeout: ApiRequest::DEFAULT_TIMEOUT * 3,
        }
    }

    /// 일반/장시간 요청 타임아웃을 지정합니다.
    pub fn with_timeouts(mut self, timeout: Duration, long_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.long_timeout = long_timeout;
        self
    }

    /// 세션의 역할
    pub fn role(&self) -> Role {
        self.role
    }

    /// 세션의 자격 증명
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// 일반 요청 타임아웃
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 장시간 요청 타임아웃
    pub fn long_timeout(&self) -> Duration {
        self.long_timeout
    }

    /// 요청에 자격 증명을 붙여 보내고 2xx 응답만 반환합니다.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, FreightcheckError> {
        let request = request.with_authorization(self.credential.token.clone());
        debug!(
            role = %self.role,
            method = request.method.as_str(),
            path = %request.path,
            "sending request"
        );
        let response = self.transport.send(request.clone()).await?;
        response.error_for_status(&request)
    }

    /// `GET` 후 응답을 `R`로 디코드합니다.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, FreightcheckError> {
        let response = self
            .execute(ApiRequest::get(path).with_timeout(self.timeout))
            .await?;
        response.decode(path)
    }

    /// `POST` 후 응답을 `R`로 디코드합니다.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, FreightcheckError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.post_with_timeout(path, body, self.timeout).await
    }

    /// 장시간 타임아웃으로 `POST` 합니다 (생성+발행 등).
    pub async fn post_json_long<B, R>(&self, path: &str, body: &B) -> Result<R, FreightcheckError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.post_with_timeout(path, body, self.long_timeout).await
    }

    /// 응답 본문이 필요 없는 `POST`
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), FreightcheckError>
    where
        B: Serialize + ?Sized,
    {
        let body = to_value(path, body)?;
        self.execute(ApiRequest::post(path, body).with_timeout(self.timeout))
            .await?;
        Ok(())
    }

    /// `DELETE`; 응답 본문은 무시합니다.
    pub async fn delete(&self, path: &str) -> Result<(), FreightcheckError> {
        self.execute(ApiRequest::delete(path).with_timeout(self.timeout))
            .await?;
        Ok(())
    }

    async fn post_with_timeout<B, R>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R, FreightcheckError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_value(path, body)?;
        let response = self
            .execute(ApiRequest::post(path, body).with_timeout(timeout))
            .await?;
        response.decode(path)
    }
}

fn to_value<B: Serialize + ?Sized>(path: &str, body: &B) -> Result<serde_json::Value, FreightcheckError> {
    serde_json::to_value(body).map_err(|e| FreightcheckError::Decode {
        path: path.to_owned(),
        reason: format!("failed to encode request body: {e}"),
    })
}
