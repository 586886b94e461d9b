//! Tariff listing and details.

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const LIST_PATH: &str = "/tariffs/list";

/// `GET /tariffs/{id}`
pub fn tariff_path(id: i64) -> String {
    format!("/tariffs/{id}")
}

/// Tariff status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TariffStatus {
    Inactive,
    Active,
}

impl TariffStatus {
    fn code(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// `null` asks for every tariff on one page.
    items_per_page: Option<u32>,
    status: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /tariffs/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffList {
    pub items_count: u64,
    #[serde(default)]
    pub tariffs: Vec<Tariff>,
}

impl TariffList {
    /// Whether the page holds every counted tariff.
    pub fn is_complete(&self) -> bool {
        self.tariffs.len() as u64 == self.items_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCost {
    pub article: String,
    pub vehicle_type_id: i64,
    pub cost_per_service: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseWorkCost {
    pub vehicle_type_id: i64,
    pub cost: i64,
    pub hours_work: i64,
    pub hours_innings: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffParams {
    #[serde(default)]
    pub service_costs: Vec<ServiceCost>,
    #[serde(default)]
    pub base_work_costs: Vec<BaseWorkCost>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /tariffs/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffDetails {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    #[serde(default)]
    pub params: TariffParams,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TariffDetails {
    /// Per-service cost for a vehicle type.
    pub fn service_cost(&self, article: &str, vehicle_type_id: i64) -> Option<i64> {
        self.params
            .service_costs
            .iter()
            .find(|c| c.article == article && c.vehicle_type_id == vehicle_type_id)
            .map(|c| c.cost_per_service)
    }

    /// Base hourly work terms for a vehicle type.
    pub fn base_work(&self, vehicle_type_id: i64) -> Option<&BaseWorkCost> {
        self.params
            .base_work_costs
            .iter()
            .find(|c| c.vehicle_type_id == vehicle_type_id)
    }
}

pub struct TariffClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> TariffClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    pub async fn list(
        &self,
        items_per_page: Option<u32>,
        status: TariffStatus,
    ) -> Result<TariffList, FreightcheckError> {
        let query = ListQuery {
            items_per_page,
            status: status.code(),
        };
        let list: TariffList = self.session.post_json(LIST_PATH, &query).await?;
        debug!(items_count = list.items_count, page = list.tariffs.len(), "tariffs listed");
        Ok(list)
    }

    pub async fn get(&self, id: i64) -> Result<TariffDetails, FreightcheckError> {
        let tariff: TariffDetails = self.session.get_json(&tariff_path(id)).await?;
        debug!(
            id = tariff.id,
            active = tariff.is_active,
            services = tariff.params.service_costs.len(),
            "tariff fetched"
        );
        Ok(tariff)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use freightcheck_core::role::Role;
    use freightcheck_core::transport::Method;
    use freightcheck_core::transport::mock::MockTransport;
    use freightcheck_core::types::Credential;
    use serde_json::json;

    use super::*;

    fn client(mock: MockTransport) -> (Arc<MockTransport>, TariffClient<MockTransport>) {
        let transport = Arc::new(mock);
        let session = ApiSession::new(
            Arc::clone(&transport),
            Role::Expeditor,
            Credential {
                token: "Bearer t".to_owned(),
                role_id: 2,
            },
        );
        (transport, TariffClient::new(session))
    }

    #[tokio::test]
    async fn unpaged_list_is_complete() {
        let (transport, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_PATH,
            200,
            json!({"itemsCount": 2, "tariffs": [{"id": 1, "title": "a"}, {"id": 2}]}),
        ));

        let list = client.list(None, TariffStatus::Active).await.unwrap();

        assert!(list.is_complete());
        assert_eq!(list.tariffs[0].extra["title"], "a");
        let sent = transport.last(Method::Post, LIST_PATH).unwrap();
        assert_eq!(sent.body.unwrap(), json!({"itemsPerPage": null, "status": 1}));
    }

    #[tokio::test]
    async fn paged_list_sends_page_size() {
        let (transport, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_PATH,
            200,
            json!({"itemsCount": 400, "tariffs": [{"id": 1}]}),
        ));

        let list = client.list(Some(100), TariffStatus::Inactive).await.unwrap();

        assert!(!list.is_complete());
        let sent = transport.last(Method::Post, LIST_PATH).unwrap();
        assert_eq!(sent.body.unwrap(), json!({"itemsPerPage": 100, "status": 0}));
    }

    #[tokio::test]
    async fn non_numeric_items_count_is_decode_error() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_PATH,
            200,
            json!({"itemsCount": "many", "tariffs": []}),
        ));
        let err = client.list(None, TariffStatus::Active).await.unwrap_err();
        assert!(matches!(err, FreightcheckError::Decode { .. }));
    }

    #[tokio::test]
    async fn tariff_details_expose_costs() {
        let path = tariff_path(42);
        let (transport, client) = client(MockTransport::new().on_json(
            Method::Get,
            &path,
            200,
            json!({
                "id": 42,
                "title": "Почасовой",
                "isActive": true,
                "type": 1,
                "params": {
                    "serviceCosts": [
                        {"article": "loading", "vehicleTypeId": 1, "costPerService": 500}
                    ],
                    "baseWorkCosts": [
                        {"vehicleTypeId": 1, "cost": 1200, "hoursWork": 4, "hoursInnings": 1}
                    ]
                }
            }),
        ));

        let tariff = client.get(42).await.unwrap();

        assert_eq!(path, "/tariffs/42");
        assert!(tariff.is_active);
        assert_eq!(tariff.service_cost("loading", 1), Some(500));
        assert_eq!(tariff.service_cost("loading", 2), None);
        assert_eq!(tariff.base_work(1).map(|c| c.hours_work), Some(4));
        assert_eq!(tariff.extra["type"], 1);
        assert_eq!(transport.count(Method::Get, &path), 1);
        assert!(transport.last(Method::Get, &path).unwrap().body.is_none());
    }

    #[tokio::test]
    async fn tariff_without_params_has_no_costs() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Get,
            &tariff_path(7),
            200,
            json!({"id": 7, "title": "Пустой", "isActive": false}),
        ));

        let tariff = client.get(7).await.unwrap();

        assert!(tariff.params.service_costs.is_empty());
        assert!(tariff.base_work(1).is_none());
    }

    #[tokio::test]
    async fn unknown_tariff_is_http_error() {
        let (_, client) = client(MockTransport::new());
        let err = client.get(999).await.unwrap_err();
        assert!(matches!(err, FreightcheckError::Http { status: 404, .. }));
    }
}
