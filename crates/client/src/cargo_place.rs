//! Cargo places.
//!
//! Creation (singly or in batches), lookup by invoice number or by id
//! group, and replacement of planned cargo places with actual ones.

use freightcheck_core::error::{CorrelationError, FreightcheckError};
use freightcheck_core::sequence::TitleSequence;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::random;
use crate::record::{BatchRequest, BatchResponse, CreatedEntity, opt_string_or_number};

pub const CREATE_OR_UPDATE_PATH: &str = "/cargo-place/create-or-update";
pub const CREATE_LIST_PATH: &str = "/cargo-place/create-list";
pub const CREATE_OR_UPDATE_LIST_PATH: &str = "/cargo-place/create-or-update-list";
pub const GROUP_INFO_PATH: &str = "/cargo-place/group-info";
pub const LIST_BY_INVOICE_PATH: &str = "/cargo-place/list-by-invoice";
pub const REPLACE_PLANNED_PAIRS_PATH: &str = "/cargo-place/replace-planned-pairs";

/// Cargo place statuses reported by `list-by-invoice`.
pub const CARGO_STATUSES: [&str; 10] = [
    "new",
    "waiting_for_sending",
    "sent",
    "handed",
    "handover",
    "not_accepted",
    "accepted",
    "received",
    "not_delivered",
    "lost",
];

/// Payload for `create-or-update`.
///
/// Volume is in cm³ and weight in grams on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoPlaceDraft {
    #[serde(rename = "type")]
    pub cargo_type: String,
    pub title: String,
    pub volume: i64,
    pub weight: i64,
    pub reverse_cargo_type: String,
    pub reverse_cargo_reason: String,
    pub comment: String,
    pub status: String,
    pub departure_address_external_id: String,
    pub delivery_address_external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

impl CargoPlaceDraft {
    /// A draft between two addresses with a sequenced title and random
    /// type, weight (100–1000 kg) and volume (1–3 m³).
    pub fn random(titles: &TitleSequence, departure_ext: &str, delivery_ext: &str) -> Self {
        Self {
            cargo_type: random::cargo_type().to_owned(),
            title: titles.next_title(),
            volume: random::int_between(1, 3) * 1_000_000,
            weight: random::int_between(100, 1000) * 1000,
            reverse_cargo_type: "other".to_owned(),
            reverse_cargo_reason: String::new(),
            comment: "External API test".to_owned(),
            status: "new".to_owned(),
            departure_address_external_id: departure_ext.to_owned(),
            delivery_address_external_id: delivery_ext.to_owned(),
            external_id: None,
            invoice_number: None,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_invoice(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_weight_kg(mut self, kg: f64) -> Self {
        self.weight = (kg * 1000.0).round() as i64;
        self
    }

    pub fn with_volume_m3(mut self, m3: f64) -> Self {
        self.volume = (m3 * 1_000_000.0).round() as i64;
        self
    }
}

/// One cargo place of a `create-list` / `create-or-update-list` batch.
///
/// Unlike [`CargoPlaceDraft`] it carries dimensions, a barcode and
/// send/delivery windows, and is created ready for sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCargoPlaceDraft {
    pub status: String,
    pub bar_code: String,
    #[serde(rename = "type")]
    pub cargo_type: String,
    pub departure_address_external_id: String,
    pub delivery_address_external_id: String,
    pub invoice_number: String,
    pub invoice_numbers: Vec<String>,
    pub external_id: String,
    pub is_planned: bool,
    /// cm
    pub length: i64,
    pub width: i64,
    pub height: i64,
    /// cm³, always `length * width * height`
    pub volume: i64,
    /// grams
    pub weight: i64,
    pub quantity: i64,
    pub required_send_at_from: String,
    pub required_send_at_till: String,
    pub required_delivered_at_from: String,
    pub required_delivered_at_till: String,
    pub wms_number: String,
    pub invoice_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
}

impl BatchCargoPlaceDraft {
    /// Sent today between 09:00 and 18:00, delivered two days later.
    pub fn random(departure_ext: &str, delivery_ext: &str, external_id: &str) -> Self {
        let (length, width, height) = (
            random::int_between(10, 200),
            random::int_between(10, 150),
            random::int_between(10, 150),
        );
        let invoice = random::invoice_number();
        let today = random::local_date_in(0);
        let delivered = random::local_date_in(2);
        Self {
            status: "waiting_for_sending".to_owned(),
            bar_code: format!("BC-{external_id}"),
            cargo_type: random::cargo_type().to_owned(),
            departure_address_external_id: departure_ext.to_owned(),
            delivery_address_external_id: delivery_ext.to_owned(),
            invoice_number: invoice.clone(),
            invoice_numbers: vec![invoice],
            external_id: external_id.to_owned(),
            is_planned: false,
            length,
            width,
            height,
            volume: length * width * height,
            weight: random::int_between(500, 20_000),
            quantity: random::int_between(1, 50),
            required_send_at_from: format!("{today}T09:00:00"),
            required_send_at_till: format!("{today}T18:00:00"),
            required_delivered_at_from: format!("{delivered}T09:00:00"),
            required_delivered_at_till: format!("{delivered}T18:00:00"),
            wms_number: format!("WMS-{external_id}"),
            invoice_date: today,
            producer_id: None,
            contract_id: None,
            client_id: None,
        }
    }

    pub fn planned(mut self, is_planned: bool) -> Self {
        self.is_planned = is_planned;
        self
    }

    /// Producer, contract and client the addresses are validated against.
    pub fn with_context(mut self, producer_id: i64, contract_id: i64, client_id: i64) -> Self {
        self.producer_id = Some(producer_id);
        self.contract_id = Some(contract_id);
        self.client_id = Some(client_id);
        self
    }
}

/// One cargo place as reported by `group-info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCargoPlace {
    pub id: i64,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupInfoQuery<'a> {
    ids: &'a [i64],
    external_ids: &'a [String],
}

/// `group-info` answers with a bare list on most deployments and with an
/// envelope on some.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupInfoResponse {
    List(Vec<GroupCargoPlace>),
    CargoPlaces {
        #[serde(rename = "cargoPlaces")]
        cargo_places: Vec<GroupCargoPlace>,
    },
    Data {
        data: Vec<GroupCargoPlace>,
    },
}

impl From<GroupInfoResponse> for Vec<GroupCargoPlace> {
    fn from(response: GroupInfoResponse) -> Self {
        match response {
            GroupInfoResponse::List(list)
            | GroupInfoResponse::CargoPlaces { cargo_places: list }
            | GroupInfoResponse::Data { data: list } => list,
        }
    }
}

/// One entry of `list-by-invoice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCargoPlace {
    pub cargo_place_id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_address: Option<Value>,
    #[serde(default)]
    pub status_update_at: Option<String>,
}

/// `list-by-invoice` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCargoList {
    pub cargo_places: Vec<InvoiceCargoPlace>,
}

/// A planned → actual replacement pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlannedPair {
    /// By internal ids
    ById {
        #[serde(rename = "plannedId")]
        planned_id: i64,
        #[serde(rename = "cargoPlaceId")]
        cargo_place_id: i64,
    },
    /// By external ids
    ByExternalId {
        #[serde(rename = "plannedExternalId")]
        planned_external_id: String,
        #[serde(rename = "cargoPlaceExternalId")]
        cargo_place_external_id: String,
    },
}

impl PlannedPair {
    pub fn by_id(planned: &EntityRef, actual: &EntityRef) -> Self {
        Self::ById {
            planned_id: planned.internal_id,
            cargo_place_id: actual.internal_id,
        }
    }

    pub fn by_external_id(planned: &EntityRef, actual: &EntityRef) -> Self {
        Self::ByExternalId {
            planned_external_id: planned.external_id.clone(),
            cargo_place_external_id: actual.external_id.clone(),
        }
    }
}

/// How a replacement was finally accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMethod {
    InternalId,
    ExternalId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceRequest<'a> {
    items: &'a [PlannedPair],
    is_strict: bool,
}

/// Client for cargo place endpoints.
pub struct CargoPlaceClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> CargoPlaceClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    /// Creates (or updates, by external id) a cargo place.
    pub async fn create_or_update(
        &self,
        draft: &CargoPlaceDraft,
    ) -> Result<CreatedEntity, FreightcheckError> {
        let created: CreatedEntity = self.session.post_json(CREATE_OR_UPDATE_PATH, draft).await?;
        info!(id = created.id, title = %draft.title, "cargo place saved");
        Ok(created)
    }

    /// Creates a cargo place and returns its reference.
    ///
    /// The draft's own external id is the fallback when the response omits one.
    pub async fn create_ref(&self, draft: &CargoPlaceDraft) -> Result<EntityRef, FreightcheckError> {
        let created = self.create_or_update(draft).await?;
        Ok(created.to_ref(EntityKind::CargoPlace, draft.external_id.as_deref())?)
    }

    /// Creates a batch of new cargo places; references follow request order.
    pub async fn create_list(
        &self,
        drafts: &[BatchCargoPlaceDraft],
    ) -> Result<Vec<EntityRef>, FreightcheckError> {
        self.send_batch(CREATE_LIST_PATH, drafts).await
    }

    /// Like [`create_list`](Self::create_list), but places whose external id
    /// already exists are updated.
    pub async fn create_or_update_list(
        &self,
        drafts: &[BatchCargoPlaceDraft],
    ) -> Result<Vec<EntityRef>, FreightcheckError> {
        self.send_batch(CREATE_OR_UPDATE_LIST_PATH, drafts).await
    }

    async fn send_batch(
        &self,
        path: &str,
        drafts: &[BatchCargoPlaceDraft],
    ) -> Result<Vec<EntityRef>, FreightcheckError> {
        let response: BatchResponse<i64> = self
            .session
            .post_json(path, &BatchRequest { data: drafts })
            .await?;
        let ids = response.ids(path)?;
        if ids.len() != drafts.len() {
            return Err(FreightcheckError::Decode {
                path: path.to_owned(),
                reason: format!("sent {} cargo places, {} reported", drafts.len(), ids.len()),
            });
        }
        info!(path, count = ids.len(), "cargo place batch saved");
        Ok(ids
            .into_iter()
            .zip(drafts)
            .map(|(id, draft)| EntityRef {
                kind: EntityKind::CargoPlace,
                internal_id: id,
                external_id: draft.external_id.clone(),
            })
            .collect())
    }

    /// Cargo places matching any of `ids` or `external_ids`. Unknown keys
    /// are silently absent from the result.
    pub async fn group_info(
        &self,
        ids: &[i64],
        external_ids: &[String],
    ) -> Result<Vec<GroupCargoPlace>, FreightcheckError> {
        let query = GroupInfoQuery { ids, external_ids };
        let response: GroupInfoResponse = self.session.post_json(GROUP_INFO_PATH, &query).await?;
        let places: Vec<GroupCargoPlace> = response.into();
        debug!(
            requested = ids.len() + external_ids.len(),
            found = places.len(),
            "cargo place group info"
        );
        Ok(places)
    }

    /// Cargo places attached to an invoice number.
    pub async fn list_by_invoice(&self, invoice: &str) -> Result<InvoiceCargoList, FreightcheckError> {
        self.session
            .post_json(
                LIST_BY_INVOICE_PATH,
                &serde_json::json!({ "invoiceNumber": invoice }),
            )
            .await
    }

    /// The invoice entry whose `cargoPlaceId` equals `cargo_place_id`.
    pub async fn find_in_invoice(
        &self,
        invoice: &str,
        cargo_place_id: i64,
    ) -> Result<InvoiceCargoPlace, FreightcheckError> {
        let list = self.list_by_invoice(invoice).await?;
        find_cargo_place(list, invoice, cargo_place_id).map_err(FreightcheckError::from)
    }

    /// Replaces planned cargo places with actual ones.
    pub async fn replace_planned_pairs(
        &self,
        pairs: &[PlannedPair],
        strict: bool,
    ) -> Result<Vec<Value>, FreightcheckError> {
        let request = ReplaceRequest {
            items: pairs,
            is_strict: strict,
        };
        self.session
            .post_json(REPLACE_PLANNED_PAIRS_PATH, &request)
            .await
    }

    /// Replaces by internal ids, then by external ids if the API rejects that.
    ///
    /// Only an HTTP rejection triggers the second attempt; its error is
    /// returned if both fail.
    pub async fn replace_with_fallback(
        &self,
        planned: &[EntityRef],
        actual: &[EntityRef],
        strict: bool,
    ) -> Result<(ReplaceMethod, Vec<Value>), FreightcheckError> {
        let by_id: Vec<PlannedPair> = planned
            .iter()
            .zip(actual)
            .map(|(p, a)| PlannedPair::by_id(p, a))
            .collect();

        match self.replace_planned_pairs(&by_id, strict).await {
            Ok(response) => Ok((ReplaceMethod::InternalId, response)),
            Err(FreightcheckError::Http { status, body, .. }) => {
                warn!(status, body = %body, "replacement by internal id rejected, retrying by external id");
                let by_ext: Vec<PlannedPair> = planned
                    .iter()
                    .zip(actual)
                    .map(|(p, a)| PlannedPair::by_external_id(p, a))
                    .collect();
                let response = self.replace_planned_pairs(&by_ext, strict).await?;
                Ok((ReplaceMethod::ExternalId, response))
            }
            Err(e) => Err(e),
        }
    }
}

/// Exact `cargoPlaceId` match within an invoice listing.
pub fn find_cargo_place(
    list: InvoiceCargoList,
    invoice: &str,
    cargo_place_id: i64,
) -> Result<InvoiceCargoPlace, CorrelationError> {
    list.cargo_places
        .into_iter()
        .find(|cp| cp.cargo_place_id == cargo_place_id)
        .ok_or_else(|| CorrelationError::NotFound {
            entity: "cargo place".to_owned(),
            key: cargo_place_id.to_string(),
            source_name: format!("invoice {invoice}"),
        })
}
