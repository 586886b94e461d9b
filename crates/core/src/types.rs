//! 도메인 타입 — 자격 증명과 엔티티 참조

use std::fmt;

use serde::{Deserialize, Serialize};

/// 로그인으로 얻은 자격 증명
///
/// `token`은 `Authorization` 헤더 값으로 가공 없이 사용됩니다.
/// 로그인 응답이 이미 스킴(`Bearer `)을 포함하고 있기 때문입니다.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// 인증 토큰
    pub token: String,
    /// 서버가 부여한 역할 ID
    #[serde(rename = "role")]
    pub role_id: i64,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<hidden>")
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// 원격 API가 관리하는 엔티티 종류
///
/// 종류마다 생성 응답에서 식별자를 읽는 규칙이 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// 주소 (contractor point)
    Address,
    /// 화물 단위
    CargoPlace,
    /// 운송 주문
    TransportOrder,
    /// 배송 요청
    DeliveryRequest,
    /// 운전자
    Driver,
    /// 차량 (트럭, 트랙터, 트레일러)
    Vehicle,
}

impl EntityKind {
    /// 내부 ID 필드명
    pub fn internal_id_field(&self) -> &'static str {
        "id"
    }

    /// 외부 ID 필드명
    pub fn external_id_field(&self) -> &'static str {
        match self {
            Self::Address | Self::CargoPlace => "externalId",
            Self::TransportOrder => "orderIdentifier",
            Self::DeliveryRequest => "requestNr",
            Self::Driver => "driverLicenseId",
            Self::Vehicle => "plateNumber",
        }
    }

    /// 로그/에러 메시지용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::CargoPlace => "cargo_place",
            Self::TransportOrder => "transport_order",
            Self::DeliveryRequest => "delivery_request",
            Self::Driver => "driver",
            Self::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 생성된 엔티티의 참조
///
/// 생성 이후 두 식별자를 항상 함께 추적합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// 엔티티 종류
    pub kind: EntityKind,
    /// API 내부 정수 ID
    pub internal_id: i64,
    /// 호출자가 지정한 외부 ID
    pub external_id: String,
}

impl EntityRef {
    /// 지정한 필드의 값을 JSON으로 반환합니다.
    pub fn field_value(&self, field: RefField) -> serde_json::Value {
        match field {
            RefField::InternalId => serde_json::Value::from(self.internal_id),
            RefField::ExternalId => serde_json::Value::from(self.external_id.clone()),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.kind, self.internal_id, self.external_id)
    }
}

/// 엔티티 참조의 어느 식별자를 사용할지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefField {
    /// 내부 정수 ID
    InternalId,
    /// 외부 문자열 ID
    ExternalId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_deserializes_login_shape() {
        let credential: Credential =
            serde_json::from_str(r#"{"token":"Bearer a.b.c","role":3}"#).unwrap();
        assert_eq!(credential.token, "Bearer a.b.c");
        assert_eq!(credential.role_id, 3);
    }

    #[test]
    fn credential_debug_hides_token() {
        let credential = Credential {
            token: "Bearer secret.jwt.value".to_owned(),
            role_id: 1,
        };
        assert!(!format!("{credential:?}").contains("secret"));
    }

    #[test]
    fn external_id_field_per_kind() {
        assert_eq!(EntityKind::Address.external_id_field(), "externalId");
        assert_eq!(EntityKind::CargoPlace.external_id_field(), "externalId");
        assert_eq!(
            EntityKind::TransportOrder.external_id_field(),
            "orderIdentifier"
        );
        assert_eq!(EntityKind::DeliveryRequest.external_id_field(), "requestNr");
        assert_eq!(EntityKind::Driver.external_id_field(), "driverLicenseId");
        assert_eq!(EntityKind::Vehicle.external_id_field(), "plateNumber");
    }

    #[test]
    fn field_value_returns_typed_json() {
        let reference = EntityRef {
            kind: EntityKind::Address,
            internal_id: 10,
            external_id: "A1".to_owned(),
        };
        assert_eq!(reference.field_value(RefField::InternalId), serde_json::json!(10));
        assert_eq!(reference.field_value(RefField::ExternalId), serde_json::json!("A1"));
        assert_eq!(reference.to_string(), "address#10 (A1)");
    }
}
