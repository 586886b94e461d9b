//! Shipment tasks.
//!
//! Tasks are identified by a server-assigned UUID string rather than a
//! numeric id, so they do not take part in entity chains. Besides single
//! create/get/update, tasks can be created in batches, deleted, and listed
//! with the delivery requests that carry them.

use std::fmt;

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::random;
use crate::record::{BatchRequest, BatchResponse};

pub const CREATE_PATH: &str = "/shipment/tasks/create";
pub const CREATE_LIST_PATH: &str = "/shipment/tasks/create-list";
pub const DELIVERY_REQUEST_LIST_PATH: &str = "/shipment/tasks/cargo-delivery-request/list";

pub fn task_path(id: &TaskId) -> String {
    format!("/shipment/tasks/{id}")
}

pub fn update_path(id: &TaskId) -> String {
    format!("/shipment/tasks/{id}/update")
}

/// Server-assigned task id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointId {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub inn: String,
    pub kpp: String,
}

/// Payload for task create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub number: String,
    pub title: String,
    pub ship_by: String,
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_task_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cargo_places_enabled: Option<bool>,
    pub departure_point: PointId,
    pub arrival_point: PointId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consignee: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipper: Option<Party>,
    pub required_sent_at_from: String,
    pub required_sent_at_till: String,
    pub required_delivered_at_from: String,
    pub required_delivered_at_till: String,
    /// cm³
    pub volume: i64,
    /// grams
    pub weight: i64,
    /// kopecks
    pub cost: i64,
    pub quantity: i64,
}

impl TaskDraft {
    /// A new task between two existing points, sent over the next four days.
    pub fn random(departure: i64, arrival: i64) -> Self {
        Self::with_window(departure, arrival, 1).with_parties()
    }

    /// An update payload: dates shifted ten days later and a fresh
    /// `externalTaskNumber`.
    pub fn random_update(departure: i64, arrival: i64) -> Self {
        let mut draft = Self::with_window(departure, arrival, 11);
        draft.external_task_number = Some(random::external_task_number());
        draft
    }

    /// A batch entry: no parties, cargo places disabled, 100–500 kg.
    pub fn batch_item(departure: i64, arrival: i64) -> Self {
        let mut draft = Self::with_window(departure, arrival, 1);
        draft.is_cargo_places_enabled = Some(false);
        draft.weight = random::int_between(100, 500) * 1_000;
        draft
    }

    fn with_window(departure: i64, arrival: i64, first_day: i64) -> Self {
        Self {
            number: random::task_number(),
            title: random::product_name().to_owned(),
            ship_by: random::ship_by().to_owned(),
            types: vec![random::package_type().to_owned()],
            external_task_number: None,
            is_cargo_places_enabled: None,
            departure_point: PointId { id: departure },
            arrival_point: PointId { id: arrival },
            consignee: None,
            shipper: None,
            required_sent_at_from: random::utc_timestamp_in(first_day),
            required_sent_at_till: random::utc_timestamp_in(first_day + 1),
            required_delivered_at_from: random::utc_timestamp_in(first_day + 2),
            required_delivered_at_till: random::utc_timestamp_in(first_day + 3),
            volume: random::int_between(1, 10) * 1_000_000,
            weight: random::int_between(1, 10) * 1_000,
            cost: random::int_between(10_000, 1_000_000_000),
            quantity: random::int_between(1, 100),
        }
    }

    fn with_parties(mut self) -> Self {
        self.is_cargo_places_enabled = Some(true);
        self.consignee = Some(Party {
            inn: "7724656304".to_owned(),
            kpp: "771501001".to_owned(),
        });
        self.shipper = Some(Party {
            inn: "5321162475".to_owned(),
            kpp: "532101001".to_owned(),
        });
        self
    }
}

/// `GET /shipment/tasks/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentTask {
    pub id: TaskId,
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub ship_by: Option<String>,
    #[serde(default)]
    pub external_task_number: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub departure_point: PointId,
    pub arrival_point: PointId,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShipmentTask {
    /// Fields of `draft` the API does not store verbatim are ignored; dates
    /// are compared to the hour.
    pub fn matches(&self, draft: &TaskDraft) -> bool {
        let hour = |v: Option<&Value>, expected: &str| {
            v.and_then(Value::as_str)
                .is_some_and(|s| s.get(..13) == expected.get(..13))
        };
        self.number == draft.number
            && self.title == draft.title
            && self.ship_by.as_deref() == Some(draft.ship_by.as_str())
            && self.external_task_number == draft.external_task_number
            && self.types == draft.types
            && self.departure_point == draft.departure_point
            && self.arrival_point == draft.arrival_point
            && self.volume == Some(draft.volume)
            && self.weight == Some(draft.weight)
            && self.cost == Some(draft.cost)
            && self.quantity == Some(draft.quantity)
            && hour(self.extra.get("requiredSentAtFrom"), &draft.required_sent_at_from)
            && hour(self.extra.get("requiredDeliveredAtTill"), &draft.required_delivered_at_till)
    }
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    id: TaskId,
}

#[derive(Debug, Serialize)]
struct DeliveryRequestQuery<'a> {
    id: &'a TaskId,
}

/// Client for shipment task endpoints.
pub struct ShipmentTaskClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> ShipmentTaskClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<TaskId, FreightcheckError> {
        let created: CreatedTask = self.session.post_json(CREATE_PATH, draft).await?;
        info!(task = %created.id, number = %draft.number, "shipment task created");
        Ok(created.id)
    }

    /// Creates tasks in one call; ids follow request order.
    pub async fn create_list(&self, drafts: &[TaskDraft]) -> Result<Vec<TaskId>, FreightcheckError> {
        let response: BatchResponse<TaskId> = self
            .session
            .post_json(CREATE_LIST_PATH, &BatchRequest { data: drafts })
            .await?;
        let ids = response.ids(CREATE_LIST_PATH)?;
        if ids.len() != drafts.len() {
            return Err(FreightcheckError::Decode {
                path: CREATE_LIST_PATH.to_owned(),
                reason: format!("sent {} tasks, {} reported", drafts.len(), ids.len()),
            });
        }
        info!(count = ids.len(), "shipment tasks created");
        Ok(ids)
    }

    /// Delivery requests the task is attached to. The listing is returned
    /// as sent.
    pub async fn delivery_requests(&self, id: &TaskId) -> Result<Value, FreightcheckError> {
        let list: Value = self
            .session
            .post_json(DELIVERY_REQUEST_LIST_PATH, &DeliveryRequestQuery { id })
            .await?;
        debug!(task = %id, "task delivery requests listed");
        Ok(list)
    }

    pub async fn delete(&self, id: &TaskId) -> Result<(), FreightcheckError> {
        self.session.delete(&task_path(id)).await?;
        info!(task = %id, "shipment task deleted");
        Ok(())
    }

    pub async fn get(&self, id: &TaskId) -> Result<ShipmentTask, FreightcheckError> {
        self.session.get_json(&task_path(id)).await
    }

    pub async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<(), FreightcheckError> {
        self.session.post_unit(&update_path(id), draft).await?;
        info!(task = %id, "shipment task updated");
        Ok(())
    }
}
