//! Response records shared by several endpoints.

use freightcheck_core::chain;
use freightcheck_core::error::CorrelationError;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Per-item and overall status of a successful batch.
pub const BATCH_OK: &str = "ok";

/// Minimal body returned by create-style endpoints.
///
/// Only `id` is guaranteed; `externalId` and `status` are echoed by some
/// endpoints and are `None` (or `null`) elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    pub id: i64,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreatedEntity {
    /// Builds an entity reference with the same rules as a chain step,
    /// falling back to `fallback` when the response carries no usable
    /// external id.
    pub fn to_ref(
        &self,
        kind: EntityKind,
        fallback: Option<&str>,
    ) -> Result<EntityRef, CorrelationError> {
        let mut response = Map::new();
        response.insert(kind.internal_id_field().to_owned(), Value::from(self.id));
        if let Some(external_id) = &self.external_id {
            response.insert(
                kind.external_id_field().to_owned(),
                Value::from(external_id.as_str()),
            );
        }
        chain::extract_ref(kind.as_str(), kind, &Value::Object(response), fallback)
    }
}

/// Request envelope of the `*-list` batch endpoints.
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a, T> {
    pub data: &'a [T],
}

/// One entry of a batch response, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "I: DeserializeOwned"))]
pub struct BatchItem<I> {
    #[serde(default)]
    pub id: Option<I>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<I> BatchItem<I> {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(BATCH_OK) && self.errors.is_empty()
    }
}

/// Response envelope of the `*-list` batch endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "I: DeserializeOwned"))]
pub struct BatchResponse<I> {
    pub status: String,
    #[serde(default)]
    pub data: Vec<BatchItem<I>>,
}

impl<I: Clone> BatchResponse<I> {
    /// Ids of every item, or the first rejected item as an error.
    ///
    /// `step` names the endpoint in the error.
    pub fn ids(&self, step: &str) -> Result<Vec<I>, CorrelationError> {
        self.data
            .iter()
            .enumerate()
            .map(|(index, item)| match (&item.id, item.is_ok()) {
                (Some(id), true) => Ok(id.clone()),
                _ => Err(CorrelationError::ItemRejected {
                    step: step.to_owned(),
                    index,
                    status: item.status.clone().unwrap_or_default(),
                    errors: Value::from(item.errors.clone()).to_string(),
                }),
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Reads a field the API sends either as a string or as a bare number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

/// [`string_or_number`] for nullable fields.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
