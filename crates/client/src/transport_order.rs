//! Transport orders (trips).

use freightcheck_core::error::{CorrelationError, FreightcheckError};
use freightcheck_core::role::RoleProfile;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::address::Point;
use crate::random;
use crate::record::CreatedEntity;

pub const CREATE_PATH: &str = "/order/transport-request/create";
pub const CREATE_AND_PUBLISH_PATH: &str = "/order/transport-request/create-and-publish";

/// `GET /order/{id}/details`
pub fn details_path(order_id: i64) -> String {
    format!("/order/{order_id}/details")
}

/// A cargo place placed on a route, by 1-based route positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoPlaceSpec {
    pub cargo_place_id: i64,
    pub external_id: String,
    pub departure_point_position: u32,
    pub arrival_point_position: u32,
}

impl CargoPlaceSpec {
    pub fn new(cargo_place: &EntityRef, departure: u32, arrival: u32) -> Self {
        Self {
            cargo_place_id: cargo_place.internal_id,
            external_id: cargo_place.external_id.clone(),
            departure_point_position: departure,
            arrival_point_position: arrival,
        }
    }
}

/// A route point of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAddress {
    pub id: i64,
    pub external_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address_string: String,
    pub city_name: String,
    pub city_fias_id: Option<Value>,
    pub time_zone_id: String,
    pub contacts: Value,
    pub phone: String,
    pub email: String,
    pub title: String,
    pub attached_files: Vec<Value>,
    pub is_loading_work: bool,
    pub is_unloading_work: bool,
    pub position: u32,
    pub loading_type: i64,
    pub status_flow_type: String,
}

impl RouteAddress {
    /// Loading happens at the first point and unloading at the last.
    fn from_point(point: &Point, index: usize, len: usize) -> Result<Self, CorrelationError> {
        let id = point.id.ok_or_else(|| CorrelationError::MissingInternalId {
            step: format!("route point #{}", index + 1),
            field: "id".to_owned(),
        })?;
        let extra_str = |key: &str| {
            point
                .extra
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Ok(Self {
            id,
            external_id: point.external_id.clone().unwrap_or_default(),
            latitude: point.latitude,
            longitude: point.longitude,
            address_string: point.address_string.clone().unwrap_or_default(),
            city_name: point
                .city_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Izhevsk".to_owned()),
            city_fias_id: point.extra.get("cityFiasId").cloned(),
            time_zone_id: point
                .timezone
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Europe/Samara".to_owned()),
            contacts: point
                .extra
                .get("contacts")
                .filter(|c| !c.is_null())
                .cloned()
                .unwrap_or_else(|| serde_json::json!([""])),
            phone: extra_str("phone").unwrap_or_default(),
            email: extra_str("email").unwrap_or_default(),
            title: point
                .title
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Address".to_owned()),
            attached_files: Vec::new(),
            is_loading_work: index == 0,
            is_unloading_work: index + 1 == len,
            position: u32::try_from(index + 1).unwrap_or(u32::MAX),
            loading_type: point.loading_type.unwrap_or(1),
            status_flow_type: "fullFlow".to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerParameters {
    pub producer: i64,
    pub tariff: i64,
    pub contract: i64,
}

/// Payload for `transport-request/create[-and-publish]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub to_start_at_date: String,
    pub to_start_at_time: String,
    pub required_producers: Vec<i64>,
    pub client: i64,
    pub order_identifier: String,
    pub inner_comment: String,
    pub public_comment: String,
    pub publishing_type: String,
    pub client_rate: i64,
    pub parameters_for_producers: Vec<ProducerParameters>,
    pub order_type: i64,
    pub vehicle_type: i64,
    pub body_types: Vec<i64>,
    pub addresses: Vec<RouteAddress>,
    pub cargo_places: Vec<CargoPlaceSpec>,
}

impl OrderDraft {
    /// An order starting tomorrow at 10:00 over `route`, with the parties
    /// taken from the role profile.
    pub fn new(
        route: &[Point],
        cargo_places: Vec<CargoPlaceSpec>,
        parties: &RoleProfile,
        order_identifier: impl Into<String>,
    ) -> Result<Self, CorrelationError> {
        let addresses = route
            .iter()
            .enumerate()
            .map(|(i, p)| RouteAddress::from_point(p, i, route.len()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            to_start_at_date: random::local_date_in(1),
            to_start_at_time: "10:00".to_owned(),
            required_producers: vec![parties.producer_id],
            client: parties.client_id,
            order_identifier: order_identifier.into(),
            inner_comment: "Test trip".to_owned(),
            public_comment: String::new(),
            publishing_type: "rate".to_owned(),
            client_rate: 50_000,
            parameters_for_producers: vec![ProducerParameters {
                producer: parties.producer_id,
                tariff: 0,
                contract: parties.contract_id,
            }],
            order_type: 1,
            vehicle_type: 1,
            body_types: vec![3, 4],
            addresses,
            cargo_places,
        })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.inner_comment = comment.into();
        self
    }
}

/// A cargo place as listed in order details.
///
/// After a planned → actual replacement, `cargoPlaceId` carries the actual
/// cargo place while `id` and `externalId` may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCargoPlace {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub cargo_place_id: Option<i64>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOrderInfo {
    #[serde(default)]
    pub cargo_places: Vec<OrderCargoPlace>,
}

/// `GET /order/{id}/details`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub transport_order: TransportOrderInfo,
}

impl OrderDetails {
    /// Whether any listed cargo place refers to one of `ids` via `cargoPlaceId`.
    pub fn references_any(&self, ids: &[i64]) -> bool {
        self.transport_order
            .cargo_places
            .iter()
            .filter_map(|cp| cp.cargo_place_id)
            .any(|id| ids.contains(&id))
    }
}

/// Client for transport order endpoints.
pub struct TransportOrderClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> TransportOrderClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    /// Creates an unpublished order.
    pub async fn create(&self, draft: &OrderDraft) -> Result<EntityRef, FreightcheckError> {
        let created: CreatedEntity = self.session.post_json(CREATE_PATH, draft).await?;
        self.to_ref(created, draft)
    }

    /// Creates and publishes an order; uses the long request timeout.
    pub async fn create_and_publish(&self, draft: &OrderDraft) -> Result<EntityRef, FreightcheckError> {
        let created: CreatedEntity = self
            .session
            .post_json_long(CREATE_AND_PUBLISH_PATH, draft)
            .await?;
        self.to_ref(created, draft)
    }

    pub async fn details(&self, order_id: i64) -> Result<OrderDetails, FreightcheckError> {
        self.session.get_json(&details_path(order_id)).await
    }

    fn to_ref(&self, created: CreatedEntity, draft: &OrderDraft) -> Result<EntityRef, FreightcheckError> {
        let reference = EntityRef {
            kind: EntityKind::TransportOrder,
            internal_id: created.id,
            external_id: draft.order_identifier.clone(),
        };
        info!(order = %reference, cargo_places = draft.cargo_places.len(), "transport order created");
        Ok(reference)
    }
}
