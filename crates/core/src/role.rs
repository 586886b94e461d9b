//! 역할 — 비즈니스 페르소나와 역할별 설정
//!
//! [`Role`]은 닫힌 열거형입니다. 문자열 키는 설정/CLI 경계에서 한 번만
//! 파싱되고, 이후에는 오타가 컴파일 타임에 드러납니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 비즈니스 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// 화주 (고객 계정)
    #[serde(rename = "lkz")]
    Customer,
    /// 포워더 (계약자 계정)
    #[serde(rename = "lke")]
    Expeditor,
    /// 운송사 (실행 계정)
    #[serde(rename = "lkp")]
    Carrier,
}

impl Role {
    /// 모든 역할
    pub const ALL: [Role; 3] = [Role::Customer, Role::Expeditor, Role::Carrier];

    /// 설정/CLI에서 사용하는 키
    pub fn key(&self) -> &'static str {
        match self {
            Self::Customer => "lkz",
            Self::Expeditor => "lke",
            Self::Carrier => "lkp",
        }
    }

    /// 자격 증명 환경변수 접두사 (`LKZ_EMAIL` 등)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::Customer => "LKZ",
            Self::Expeditor => "LKE",
            Self::Carrier => "LKP",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lkz" | "customer" => Ok(Self::Customer),
            "lke" | "expeditor" => Ok(Self::Expeditor),
            "lkp" | "carrier" => Ok(Self::Carrier),
            other => Err(ConfigError::UnknownRole(other.to_owned())),
        }
    }
}

/// 역할별 설정
///
/// 로그인 자격 증명과, 주문 생성 시 사용하는 거래 당사자 ID를 담습니다.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleProfile {
    /// 로그인 이메일
    pub email: String,
    /// 로그인 비밀번호
    pub password: String,
    /// 고객 ID
    pub client_id: i64,
    /// 운송사 ID
    pub producer_id: i64,
    /// 계약 ID
    pub contract_id: i64,
}

impl RoleProfile {
    /// 이메일과 비밀번호가 모두 채워져 있는지 확인합니다.
    pub fn has_credentials(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }

    /// 비밀번호를 가린 사본을 반환합니다.
    pub fn redacted(&self) -> Self {
        Self {
            password: if self.password.is_empty() {
                String::new()
            } else {
                "***REDACTED***".to_owned()
            },
            ..self.clone()
        }
    }
}

impl fmt::Debug for RoleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleProfile")
            .field("email", &self.email)
            .field("password", &"<hidden>")
            .field("client_id", &self.client_id)
            .field("producer_id", &self.producer_id)
            .field("contract_id", &self.contract_id)
            .finish()
    }
}

/// 역할 → 설정 매핑
///
/// TOML에서는 `[roles.lkz]`, `[roles.lke]`, `[roles.lkp]` 섹션으로 표현됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleDirectory {
    /// 화주
    pub lkz: RoleProfile,
    /// 포워더
    pub lke: RoleProfile,
    /// 운송사
    pub lkp: RoleProfile,
}

impl RoleDirectory {
    /// 역할의 설정을 반환합니다.
    pub fn profile(&self, role: Role) -> &RoleProfile {
        match role {
            Role::Customer => &self.lkz,
            Role::Expeditor => &self.lke,
            Role::Carrier => &self.lkp,
        }
    }

    /// 역할의 설정을 가변 참조로 반환합니다.
    pub fn profile_mut(&mut self, role: Role) -> &mut RoleProfile {
        match role {
            Role::Customer => &mut self.lkz,
            Role::Expeditor => &mut self.lke,
            Role::Carrier => &mut self.lkp,
        }
    }

    /// 역할의 로그인 자격 증명을 반환합니다.
    ///
    /// 이메일이나 비밀번호가 비어 있으면 `ConfigError::MissingCredentials`.
    pub fn credentials(&self, role: Role) -> Result<(&str, &str), ConfigError> {
        let profile = self.profile(role);
        if !profile.has_credentials() {
            return Err(ConfigError::MissingCredentials {
                role: role.key().to_owned(),
                env_prefix: role.env_prefix().to_owned(),
            });
        }
        Ok((profile.email.trim(), profile.password.as_str()))
    }
}
