//! Cargo delivery requests (FTL/LTL).
//!
//! A customer creates and publishes a request assigned to one carrier; the
//! carrier accepts it with `take`, after which the request status becomes
//! `confirmed`. A request can also be saved as a `draft` with `create` and
//! edited with `update` until it is published.

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::random;
use crate::record::string_or_number;
use crate::transport_order::CargoPlaceSpec;

pub const CREATE_AND_PUBLISH_PATH: &str = "/cargo-delivery-requests/create-and-publish";
pub const CREATE_DRAFT_PATH: &str = "/cargo-delivery-requests/create";

/// Status reported once the assigned carrier has taken the request.
pub const CONFIRMED: &str = "confirmed";

/// Status of a saved, unpublished request.
pub const DRAFT: &str = "draft";

pub fn details_path(request_id: i64) -> String {
    format!("/cargo-delivery-requests/{request_id}/details")
}

pub fn take_path(request_id: i64) -> String {
    format!("/cargo-delivery-requests/{request_id}/take")
}

pub fn update_path(request_id: i64) -> String {
    format!("/cargo-delivery-requests/{request_id}/update")
}

/// A route point referencing an existing contractor point by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub position: u32,
    pub point: i64,
    pub is_loading_work: bool,
    pub is_unloading_work: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_arrive_at: Option<String>,
}

impl RoutePoint {
    pub fn loading(point: i64, position: u32) -> Self {
        Self {
            position,
            point,
            is_loading_work: true,
            is_unloading_work: false,
            required_arrive_at: None,
        }
    }

    pub fn unloading(point: i64, position: u32) -> Self {
        Self {
            position,
            point,
            is_loading_work: false,
            is_unloading_work: true,
            required_arrive_at: None,
        }
    }

    /// Arrival time in `DD.MM.YYYY HH:MM`.
    pub fn arrive_at(mut self, at: impl Into<String>) -> Self {
        self.required_arrive_at = Some(at.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub body_types: Vec<i64>,
    pub vehicle_type_id: i64,
    pub order_type: i64,
    pub point_change_type: i64,
    pub route: Vec<RoutePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerShare {
    pub producer: i64,
    pub rate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerShares {
    pub shares: Vec<ProducerShare>,
    pub selecting_strategy: String,
}

/// Payload for `create-and-publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequestDraft {
    pub delivery_type: String,
    pub delivery_sub_type: String,
    pub parameters: RequestParameters,
    pub comment: String,
    pub client_identifier: String,
    pub to_start_at_from: String,
    pub parameters_for_producers: ProducerShares,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cargo_places: Vec<CargoPlaceSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shipment_tasks: Vec<Value>,
}

impl DeliveryRequestDraft {
    /// An FTL request from `departure` to `delivery`, starting tomorrow and
    /// assigned to `producer` at `rate` (kopecks).
    pub fn ftl(departure: i64, delivery: i64, producer: i64, rate: i64) -> Self {
        Self {
            delivery_type: "auto".to_owned(),
            delivery_sub_type: "ftl".to_owned(),
            parameters: RequestParameters {
                body_types: vec![3, 4, 7, 8],
                vehicle_type_id: 1,
                order_type: 1,
                point_change_type: 2,
                route: vec![
                    RoutePoint::loading(departure, 1).arrive_at(random::local_datetime_in(1)),
                    RoutePoint::unloading(delivery, 2),
                ],
            },
            comment: "API test request".to_owned(),
            client_identifier: random::external_id("LKZ-LKP"),
            to_start_at_from: random::utc_timestamp_in(1),
            parameters_for_producers: ProducerShares {
                shares: vec![ProducerShare { producer, rate }],
                selecting_strategy: "rate".to_owned(),
            },
            cargo_places: Vec::new(),
            shipment_tasks: Vec::new(),
        }
    }

    pub fn with_client_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.client_identifier = identifier.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Switches to LTL with the given cargo places.
    pub fn ltl(mut self, cargo_places: Vec<CargoPlaceSpec>) -> Self {
        self.delivery_sub_type = "ltl".to_owned();
        self.cargo_places = cargo_places;
        self
    }
}

/// An FTL draft route point; both arrival bounds are sent, as `null` when
/// unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRoutePoint {
    pub position: u32,
    pub point: i64,
    pub is_loading_work: bool,
    pub is_unloading_work: bool,
    pub required_arrive_at_from: Option<String>,
    pub required_arrive_at_till: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftParameters {
    pub order_category: i64,
    pub body_types: Vec<i64>,
    pub is_dangerous_goods: bool,
    pub vehicle_type_id: i64,
    /// 1 = city, 3 = intercity
    pub order_type: i64,
    pub point_change_type: i64,
    pub route: Vec<DraftRoutePoint>,
}

/// A cargo place already attached to a request, by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoPlaceId {
    pub id: i64,
}

/// Payload for draft `create` and `update`.
///
/// LTL drafts carry their addresses at the top level and list cargo places
/// by id; FTL drafts carry the route in `parameters`. The API rejects `null`
/// for the list fields, so they are always sent, empty if need be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    pub delivery_type: String,
    pub delivery_sub_type: String,
    pub client_identifier: String,
    pub departure_point: i64,
    pub arrival_point: i64,
    pub cargo_places: Vec<CargoPlaceId>,
    pub shipment_tasks: Vec<Value>,
    pub responsible_employees: Vec<i64>,
    pub additional_services: Vec<Value>,
    pub new_cargo_places: Vec<Value>,
    pub comment: String,
    pub inner_comment: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub to_start_at_from: String,
    pub to_start_at_till: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<DraftParameters>,
}

impl DraftRequest {
    /// An LTL draft for existing cargo places, starting tomorrow in a
    /// two-hour window.
    pub fn ltl(departure: i64, arrival: i64, cargo_place_ids: &[i64]) -> Self {
        Self {
            delivery_type: "auto".to_owned(),
            delivery_sub_type: "ltl".to_owned(),
            client_identifier: random::external_id("DRAFT-LTL"),
            departure_point: departure,
            arrival_point: arrival,
            cargo_places: cargo_place_ids
                .iter()
                .map(|&id| CargoPlaceId { id })
                .collect(),
            shipment_tasks: Vec::new(),
            responsible_employees: Vec::new(),
            additional_services: Vec::new(),
            new_cargo_places: Vec::new(),
            comment: "API draft request".to_owned(),
            inner_comment: None,
            to_start_at_from: random::utc_seconds_in_hours(24),
            to_start_at_till: random::utc_seconds_in_hours(26),
            parameters: None,
        }
    }

    /// An FTL draft from `departure` to `arrival` with no cargo places.
    pub fn ftl(departure: i64, arrival: i64) -> Self {
        let mut draft = Self::ltl(departure, arrival, &[]);
        draft.delivery_sub_type = "ftl".to_owned();
        draft.client_identifier = random::external_id("DRAFT-FTL");
        draft.parameters = Some(DraftParameters {
            order_category: 1,
            body_types: vec![3, 4, 7, 8],
            is_dangerous_goods: false,
            vehicle_type_id: 1,
            order_type: 1,
            point_change_type: 2,
            route: vec![
                DraftRoutePoint {
                    position: 1,
                    point: departure,
                    is_loading_work: true,
                    is_unloading_work: false,
                    required_arrive_at_from: Some(draft.to_start_at_from.clone()),
                    required_arrive_at_till: None,
                },
                DraftRoutePoint {
                    position: 2,
                    point: arrival,
                    is_loading_work: false,
                    is_unloading_work: true,
                    required_arrive_at_from: None,
                    required_arrive_at_till: None,
                },
            ],
        });
        draft
    }

    pub fn with_client_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.client_identifier = identifier.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_inner_comment(mut self, comment: impl Into<String>) -> Self {
        self.inner_comment = Some(comment.into());
        self
    }

    /// Moves the start window; the first route point follows `from`.
    pub fn with_start_window(mut self, from: impl Into<String>, till: impl Into<String>) -> Self {
        self.to_start_at_from = from.into();
        self.to_start_at_till = till.into();
        if let Some(first) = self
            .parameters
            .as_mut()
            .and_then(|p| p.route.first_mut())
        {
            first.required_arrive_at_from = Some(self.to_start_at_from.clone());
        }
        self
    }
}

/// Body returned by `create-and-publish` and draft `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedRequest {
    pub id: i64,
    /// Sent as a string by some deployments and as a number by others.
    #[serde(deserialize_with = "string_or_number")]
    pub request_nr: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl PublishedRequest {
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            kind: EntityKind::DeliveryRequest,
            internal_id: self.id,
            external_id: self.request_nr.clone(),
        }
    }
}

/// `GET /cargo-delivery-requests/{id}/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequestDetails {
    pub id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub request_nr: String,
    pub status: String,
    #[serde(default)]
    pub delivery_sub_type: Option<String>,
    #[serde(default)]
    pub client_identifier: Option<String>,
    #[serde(default)]
    pub to_start_at_from: Option<String>,
    /// A list of `{text, ...}` entries, newest last.
    #[serde(default)]
    pub inner_comment: Option<Value>,
}

impl DeliveryRequestDetails {
    pub fn is_confirmed(&self) -> bool {
        self.status == CONFIRMED
    }

    pub fn is_draft(&self) -> bool {
        self.status == DRAFT
    }

    /// Text of the most recent inner comment.
    pub fn last_inner_comment(&self) -> Option<&str> {
        self.inner_comment
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|comments| comments.last())
            .and_then(|comment| comment.get("text"))
            .and_then(Value::as_str)
    }

    /// Whether the stored request reflects `draft`: same identifier and
    /// start time to the minute.
    pub fn reflects(&self, draft: &DraftRequest) -> bool {
        self.client_identifier.as_deref() == Some(draft.client_identifier.as_str())
            && self
                .to_start_at_from
                .as_deref()
                .is_some_and(|at| at.get(..16) == draft.to_start_at_from.get(..16))
    }
}

/// Client for delivery request endpoints.
pub struct DeliveryRequestClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> DeliveryRequestClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    /// Creates and publishes a request; uses the long request timeout.
    pub async fn create_and_publish(
        &self,
        draft: &DeliveryRequestDraft,
    ) -> Result<PublishedRequest, FreightcheckError> {
        let published: PublishedRequest = self
            .session
            .post_json_long(CREATE_AND_PUBLISH_PATH, draft)
            .await?;
        info!(
            id = published.id,
            request_nr = %published.request_nr,
            sub_type = %draft.delivery_sub_type,
            "delivery request published"
        );
        Ok(published)
    }

    /// Saves a request as a draft without publishing it.
    pub async fn create_draft(
        &self,
        draft: &DraftRequest,
    ) -> Result<PublishedRequest, FreightcheckError> {
        let created: PublishedRequest = self.session.post_json(CREATE_DRAFT_PATH, draft).await?;
        info!(
            id = created.id,
            request_nr = %created.request_nr,
            sub_type = %draft.delivery_sub_type,
            "draft delivery request created"
        );
        Ok(created)
    }

    /// Replaces a draft's fields. The response (`[]`) is not interpreted.
    pub async fn update_draft(
        &self,
        request_id: i64,
        draft: &DraftRequest,
    ) -> Result<(), FreightcheckError> {
        self.session.post_unit(&update_path(request_id), draft).await?;
        info!(
            id = request_id,
            client_identifier = %draft.client_identifier,
            "draft delivery request updated"
        );
        Ok(())
    }

    pub async fn details(&self, request_id: i64) -> Result<DeliveryRequestDetails, FreightcheckError> {
        self.session.get_json(&details_path(request_id)).await
    }

    /// Accepts the request as the assigned carrier.
    ///
    /// The response body is not interpreted.
    pub async fn take(&self, request_id: i64) -> Result<Value, FreightcheckError> {
        let taken: Value = self.session.get_json(&take_path(request_id)).await?;
        info!(id = request_id, role = %self.session.role(), "delivery request taken");
        Ok(taken)
    }
}
