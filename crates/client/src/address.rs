//! Contractor points (addresses).
//!
//! `POST /contractor-point/update` creates or updates a point keyed by
//! `externalId`; `POST /contractor-point/list-info` lists the caller's points.

use freightcheck_core::error::{CorrelationError, FreightcheckError};
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::random;
use crate::record::CreatedEntity;

pub const UPDATE_PATH: &str = "/contractor-point/update";
pub const LIST_INFO_PATH: &str = "/contractor-point/list-info";

/// Placeholder external id the API assigns to points created without one.
const UNKNOWN_EXTERNAL_ID: &str = "unknown";

/// A contractor point as returned by `list-info`.
///
/// Fields the clients do not interpret are kept in `extra` so a found point
/// can be sent back to `update` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address_string: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub loading_type: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Point {
    /// A point with an id and a real external id.
    pub fn is_usable(&self) -> bool {
        self.id.is_some()
            && self
                .external_id
                .as_deref()
                .is_some_and(|ext| !ext.is_empty() && ext != UNKNOWN_EXTERNAL_ID)
    }
}

/// `list-info` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointList {
    pub points: Vec<Point>,
}

/// Payload for `contractor-point/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub address_string: String,
    pub title: String,
    pub timezone: String,
    pub external_id: String,
    pub status: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: String,
    pub address_type: i64,
    pub loading_type: i64,
    pub lifting_capacity_max: i64,
    pub vicinity_radius: i64,
    pub max_height_from_ground_in_cm: i64,
    pub comment: String,
    pub necessary_pass: i64,
    pub status_flow_type: String,
    pub cart: i64,
    pub elevator: i64,
    pub is_favorite: i64,
    pub contacts: Vec<Value>,
    pub attached_files: Vec<Value>,
    pub average_operation_time: Vec<i64>,
    pub opening_hours: Vec<Value>,
    pub group: String,
}

impl AddressDraft {
    /// A draft in Izhevsk with randomized external id and capacities.
    pub fn random() -> Self {
        Self {
            address_string: "Russia, Izhevsk, Dzerzhinskogo st, 61".to_owned(),
            title: format!(
                "Auto API Izhevsk {}",
                chrono::Local::now().format("%H:%M:%S")
            ),
            timezone: "Europe/Samara".to_owned(),
            external_id: random::address_external_id(),
            status: true,
            latitude: 56.883_786_581_427_415,
            longitude: 53.249_709_832_522_93,
            city_name: "Izhevsk".to_owned(),
            address_type: 2,
            loading_type: 1,
            lifting_capacity_max: random::int_between(2000, 5000),
            vicinity_radius: random::int_between(2000, 40000),
            max_height_from_ground_in_cm: 300,
            comment: "delivered / picked up".to_owned(),
            necessary_pass: 0,
            status_flow_type: "fullFlow".to_owned(),
            cart: 0,
            elevator: 0,
            is_favorite: 0,
            contacts: vec![serde_json::json!({"contact": null, "email": null, "phone": null})],
            attached_files: Vec::new(),
            average_operation_time: vec![0],
            opening_hours: Vec::new(),
            group: String::new(),
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = external_id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Client for contractor point endpoints.
pub struct AddressClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> AddressClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    /// Creates a point, or updates the one with the same external id.
    pub async fn create_or_update(
        &self,
        draft: &AddressDraft,
    ) -> Result<CreatedEntity, FreightcheckError> {
        let created: CreatedEntity = self.session.post_json(UPDATE_PATH, draft).await?;
        info!(id = created.id, external_id = %draft.external_id, "address saved");
        Ok(created)
    }

    /// Sends an existing point back to `update`, e.g. after changing its title.
    pub async fn update_point(&self, point: &Point) -> Result<CreatedEntity, FreightcheckError> {
        self.session.post_json(UPDATE_PATH, point).await
    }

    /// Lists the caller's points.
    pub async fn list_info(&self, items_per_page: Option<u32>) -> Result<PointList, FreightcheckError> {
        let body = match items_per_page {
            Some(n) => serde_json::json!({ "itemsPerPage": n }),
            None => serde_json::json!({}),
        };
        let list: PointList = self.session.post_json(LIST_INFO_PATH, &body).await?;
        debug!(count = list.points.len(), "points listed");
        Ok(list)
    }

    /// The point whose external id equals `external_id` exactly.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Point>, FreightcheckError> {
        let list = self.list_info(None).await?;
        Ok(list
            .points
            .into_iter()
            .find(|p| p.external_id.as_deref() == Some(external_id)))
    }

    /// Like [`find_by_external_id`](Self::find_by_external_id), but absence is an error.
    pub async fn require_by_external_id(&self, external_id: &str) -> Result<Point, FreightcheckError> {
        self.find_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                CorrelationError::NotFound {
                    entity: "address".to_owned(),
                    key: external_id.to_owned(),
                    source_name: LIST_INFO_PATH.to_owned(),
                }
                .into()
            })
    }

    /// The first `count` usable points, in listing order.
    pub async fn usable_points(&self, count: usize) -> Result<Vec<Point>, FreightcheckError> {
        let list = self.list_info(None).await?;
        let usable: Vec<Point> = list
            .points
            .into_iter()
            .filter(Point::is_usable)
            .take(count)
            .collect();
        if usable.len() < count {
            return Err(CorrelationError::NotFound {
                entity: format!("{count} usable addresses"),
                key: format!("found {}", usable.len()),
                source_name: LIST_INFO_PATH.to_owned(),
            }
            .into());
        }
        Ok(usable)
    }

    /// Two usable points: departure and delivery.
    pub async fn two_valid_points(&self) -> Result<(Point, Point), FreightcheckError> {
        let mut points = self.usable_points(2).await?.into_iter();
        match (points.next(), points.next()) {
            (Some(departure), Some(delivery)) => Ok((departure, delivery)),
            _ => Err(CorrelationError::NotFound {
                entity: "2 usable addresses".to_owned(),
                key: "departure/delivery".to_owned(),
                source_name: LIST_INFO_PATH.to_owned(),
            }
            .into()),
        }
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

    fn client(mock: MockTransport) -> (Arc<MockTransport>, AddressClient<MockTransport>) {
        let transport = Arc::new(mock);
        let session = ApiSession::new(
            Arc::clone(&transport),
            Role::Expeditor,
            Credential {
                token: "Bearer t".to_owned(),
                role_id: 2,
            },
        );
        (transport, AddressClient::new(session))
    }

    fn points() -> serde_json::Value {
        json!({"points": [
            {"id": 1, "externalId": "unknown", "title": "placeholder"},
            {"id": null, "externalId": "NO-ID"},
            {"id": 2, "externalId": ""},
            {"id": 3, "externalId": "Izhevsk 81-870", "addressString": "Izhevsk", "cityFiasId": "abc"},
            {"id": 4, "externalId": "Izhevsk - Pastuhova - 37"},
            {"id": 5, "externalId": "Izhevsk - Telegina - 47"}
        ]})
    }

    #[test]
    fn random_draft_serializes_camel_case() {
        let draft = AddressDraft::random().with_external_id("Izhevsk-SCENARIO-1");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["externalId"], "Izhevsk-SCENARIO-1");
        assert_eq!(value["statusFlowType"], "fullFlow");
        assert!(value["liftingCapacityMax"].as_i64().unwrap() >= 2000);
        assert!(value.get("external_id").is_none());
    }

    #[test]
    fn point_keeps_unknown_fields() {
        let point: Point =
            serde_json::from_value(json!({"id": 3, "externalId": "X", "cityFiasId": "abc"})).unwrap();
        assert_eq!(point.extra["cityFiasId"], "abc");
        let back = serde_json::to_value(&point).unwrap();
        assert_eq!(back["cityFiasId"], "abc");
    }

    #[tokio::test]
    async fn usable_points_skip_placeholders() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_INFO_PATH,
            200,
            points(),
        ));

        let (departure, delivery) = client.two_valid_points().await.unwrap();

        assert_eq!(departure.id, Some(3));
        assert_eq!(delivery.id, Some(4));
    }

    #[tokio::test]
    async fn too_few_usable_points_is_error() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_INFO_PATH,
            200,
            json!({"points": [{"id": 1, "externalId": "unknown"}]}),
        ));

        let err = client.two_valid_points().await.unwrap_err();
        assert!(matches!(
            err,
            FreightcheckError::Correlation(CorrelationError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn find_by_external_id_is_exact() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_INFO_PATH,
            200,
            points(),
        ));

        assert!(client.find_by_external_id("Izhevsk 81").await.unwrap().is_none());
        let found = client
            .find_by_external_id("Izhevsk 81-870")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(3));
    }

    #[tokio::test]
    async fn list_without_points_envelope_is_decode_error() {
        let (_, client) = client(MockTransport::new().on_json(
            Method::Post,
            LIST_INFO_PATH,
            200,
            json!([{"id": 1}]),
        ));

        let err = client.list_info(None).await.unwrap_err();
        assert!(matches!(err, FreightcheckError::Decode { .. }));
    }

    #[tokio::test]
    async fn create_or_update_posts_draft() {
        let (transport, client) = client(MockTransport::new().on_json(
            Method::Post,
            UPDATE_PATH,
            200,
            json!({"id": 10}),
        ));
        let draft = AddressDraft::random().with_external_id("A1");

        let created = client.create_or_update(&draft).await.unwrap();

        assert_eq!(created.id, 10);
        let sent = transport.last(Method::Post, UPDATE_PATH).unwrap();
        assert_eq!(sent.body.unwrap()["externalId"], "A1");
    }
}
