//! 설정 관리 — freightcheck.toml 파싱 및 런타임 설정
//!
//! [`FreightcheckConfig`]는 API 접속 정보, 폴링 정책, 역할별 자격 증명을
//! 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`FREIGHTCHECK_API_DOMAIN=dev`, `LKZ_EMAIL=...` 형식)
//! 3. 설정 파일 (`freightcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), freightcheck_core::error::FreightcheckError> {
//! use freightcheck_core::config::FreightcheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = FreightcheckConfig::load("freightcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = FreightcheckConfig::parse("[api]\ndomain = \"dev\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, FreightcheckError};
use crate::poll::{Backoff, PollPolicy};
use crate::role::{Role, RoleDirectory};

/// 설정 상한값 상수
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_POLL_TIMEOUT_SECS: u64 = 3600;
const MAX_BACKOFF_FACTOR: u32 = 10;

/// freightcheck 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreightcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원격 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 폴링 설정
    #[serde(default)]
    pub poll: PollConfig,
    /// 역할별 설정
    #[serde(default)]
    pub roles: RoleDirectory,
}

impl FreightcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FreightcheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수만 적용합니다.
    ///
    /// 원래 테스트 스위트처럼 `.env`/환경변수만으로 실행할 때 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, FreightcheckError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(FreightcheckError::Config(ConfigError::FileNotFound { .. })) => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, FreightcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FreightcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                FreightcheckError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, FreightcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            FreightcheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `FREIGHTCHECK_{SECTION}_{FIELD}`
    /// 역할 자격 증명은 `{LKZ|LKE|LKP}_{FIELD}` 형식을 그대로 따릅니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "FREIGHTCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "FREIGHTCHECK_GENERAL_LOG_FORMAT");

        // API
        override_string(&mut self.api.domain, "DOMAIN");
        override_string(&mut self.api.domain, "FREIGHTCHECK_API_DOMAIN");
        override_string(&mut self.api.base_url, "FREIGHTCHECK_API_BASE_URL");
        override_u64(
            &mut self.api.request_timeout_secs,
            "FREIGHTCHECK_API_REQUEST_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.api.long_request_timeout_secs,
            "FREIGHTCHECK_API_LONG_REQUEST_TIMEOUT_SECS",
        );

        // Poll
        override_u64(&mut self.poll.timeout_secs, "FREIGHTCHECK_POLL_TIMEOUT_SECS");
        override_u64(&mut self.poll.interval_ms, "FREIGHTCHECK_POLL_INTERVAL_MS");
        override_string(&mut self.poll.backoff, "FREIGHTCHECK_POLL_BACKOFF");
        override_u32(
            &mut self.poll.backoff_factor,
            "FREIGHTCHECK_POLL_BACKOFF_FACTOR",
        );
        override_u64(
            &mut self.poll.max_interval_ms,
            "FREIGHTCHECK_POLL_MAX_INTERVAL_MS",
        );

        // Roles
        for role in Role::ALL {
            let prefix = role.env_prefix();
            let profile = self.roles.profile_mut(role);
            override_string(&mut profile.email, &format!("{prefix}_EMAIL"));
            override_string(&mut profile.password, &format!("{prefix}_PASSWORD"));
            override_i64(&mut profile.client_id, &format!("{prefix}_CLIENT_ID"));
            override_i64(&mut profile.producer_id, &format!("{prefix}_PRODUCER_ID"));
            override_i64(&mut profile.contract_id, &format!("{prefix}_CONTRACT_ID"));
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 역할 자격 증명은 여기서 요구하지 않습니다. 해당 역할을 처음
    /// 사용할 때 `ConfigError::MissingCredentials`로 드러납니다.
    pub fn validate(&self) -> Result<(), FreightcheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_domains = ["dev", "com", "ru"];
        if self.api.base_url.is_empty() && !valid_domains.contains(&self.api.domain.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "api.domain".to_owned(),
                reason: format!("must be one of: {}", valid_domains.join(", ")),
            }
            .into());
        }

        if !self.api.base_url.is_empty()
            && !(self.api.base_url.starts_with("http://")
                || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        for (field, value) in [
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            (
                "api.long_request_timeout_secs",
                self.api.long_request_timeout_secs,
            ),
        ] {
            if value == 0 || value > MAX_REQUEST_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("must be 1-{MAX_REQUEST_TIMEOUT_SECS}"),
                }
                .into());
            }
        }

        if self.poll.timeout_secs == 0 || self.poll.timeout_secs > MAX_POLL_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "poll.timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_POLL_TIMEOUT_SECS}"),
            }
            .into());
        }

        if self.poll.interval_ms == 0 || self.poll.interval_ms > self.poll.timeout_secs * 1000 {
            return Err(ConfigError::InvalidValue {
                field: "poll.interval_ms".to_owned(),
                reason: "must be greater than 0 and not exceed poll.timeout_secs".to_owned(),
            }
            .into());
        }

        let valid_backoffs = ["fixed", "exponential"];
        if !valid_backoffs.contains(&self.poll.backoff.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "poll.backoff".to_owned(),
                reason: format!("must be one of: {}", valid_backoffs.join(", ")),
            }
            .into());
        }

        if self.poll.backoff == "exponential" {
            if self.poll.backoff_factor == 0 || self.poll.backoff_factor > MAX_BACKOFF_FACTOR {
                return Err(ConfigError::InvalidValue {
                    field: "poll.backoff_factor".to_owned(),
                    reason: format!("must be 1-{MAX_BACKOFF_FACTOR}"),
                }
                .into());
            }
            if self.poll.max_interval_ms < self.poll.interval_ms {
                return Err(ConfigError::InvalidValue {
                    field: "poll.max_interval_ms".to_owned(),
                    reason: "must not be smaller than poll.interval_ms".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// 설정에서 유도한 API 기본 URL
    ///
    /// `api.base_url`이 비어 있으면 `api.domain`으로 조립합니다.
    pub fn base_url(&self) -> String {
        if self.api.base_url.is_empty() {
            format!("https://api.vezubr.{}/v1/api-ext", self.api.domain)
        } else {
            self.api.base_url.trim_end_matches('/').to_owned()
        }
    }

    /// 기본 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// 무거운 요청(생성+발행 등)의 타임아웃
    pub fn long_request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.long_request_timeout_secs)
    }

    /// 폴링 정책
    pub fn poll_policy(&self) -> PollPolicy {
        let backoff = match self.poll.backoff.as_str() {
            "exponential" => Backoff::Exponential {
                factor: self.poll.backoff_factor,
                max: Duration::from_millis(self.poll.max_interval_ms),
            },
            _ => Backoff::Fixed,
        };
        PollPolicy::new(
            Duration::from_secs(self.poll.timeout_secs),
            Duration::from_millis(self.poll.interval_ms),
        )
        .with_backoff(backoff)
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 원격 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 대상 도메인 (dev, com, ru)
    pub domain: String,
    /// 기본 URL 직접 지정 (비어 있으면 domain으로 조립)
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 생성+발행 요청 타임아웃 (초)
    pub long_request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            domain: "com".to_owned(),
            base_url: String::new(),
            request_timeout_secs: 10,
            long_request_timeout_secs: 30,
        }
    }
}

/// 폴링 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// 전체 대기 한도 (초)
    pub timeout_secs: u64,
    /// 시도 간 기본 간격 (밀리초)
    pub interval_ms: u64,
    /// 백오프 방식 (fixed, exponential)
    pub backoff: String,
    /// 지수 백오프 배수
    pub backoff_factor: u32,
    /// 지수 백오프 상한 (밀리초)
    pub max_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            interval_ms: 1000,
            backoff: "fixed".to_owned(),
            backoff_factor: 2,
            max_interval_ms: 8000,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}
