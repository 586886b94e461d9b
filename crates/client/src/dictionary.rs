//! Reference dictionaries (`GET /dictionaries`).
//!
//! The response maps group names to lists of `{id, title, ...}` entries.
//! Titles are expected in Russian; entries without a Cyrillic title are
//! reported rather than rejected.

use std::collections::BTreeMap;

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub const PATH: &str = "/dictionaries";

/// Groups every role's dictionary response carries.
pub const REQUIRED_GROUPS: [&str; 6] = [
    "cargoPlaceSegmentStatuses",
    "cargoPlaceStatuses",
    "orderUiState",
    "truckDeliveryStatus",
    "userRoles",
    "tariffTypes",
];

/// Why a dictionary entry's title is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleProblem {
    Missing,
    NotText,
    NotTranslated,
}

/// An entry whose title is missing or not in Russian.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntranslatedEntry {
    pub group: String,
    pub id: Value,
    pub problem: TitleProblem,
}

/// `GET /dictionaries`, keyed by group name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionaries {
    pub groups: BTreeMap<String, Value>,
}

impl Dictionaries {
    /// Entries of a list-valued group.
    pub fn entries(&self, group: &str) -> &[Value] {
        self.groups
            .get(group)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// [`REQUIRED_GROUPS`] absent from the response.
    pub fn missing_groups(&self) -> Vec<&'static str> {
        REQUIRED_GROUPS
            .into_iter()
            .filter(|group| !self.groups.contains_key(*group))
            .collect()
    }

    /// Entries of list-valued groups whose title is missing, not a string,
    /// or has no Cyrillic letter. Non-list groups are skipped.
    pub fn untranslated(&self) -> Vec<UntranslatedEntry> {
        let mut found = Vec::new();
        for (group, items) in &self.groups {
            let Some(items) = items.as_array() else {
                continue;
            };
            for item in items {
                let problem = match item.get("title") {
                    None => TitleProblem::Missing,
                    Some(Value::String(title)) if has_cyrillic(title) => continue,
                    Some(Value::String(_)) => TitleProblem::NotTranslated,
                    Some(_) => TitleProblem::NotText,
                };
                found.push(UntranslatedEntry {
                    group: group.clone(),
                    id: item.get("id").cloned().unwrap_or(Value::Null),
                    problem,
                });
            }
        }
        found
    }
}

fn has_cyrillic(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'))
}

pub struct DictionaryClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> DictionaryClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    /// Fetches every dictionary; untranslated entries are logged.
    pub async fn fetch(&self) -> Result<Dictionaries, FreightcheckError> {
        let dictionaries: Dictionaries = self.session.get_json(PATH).await?;
        let untranslated = dictionaries.untranslated();
        if untranslated.is_empty() {
            debug!(groups = dictionaries.groups.len(), "dictionaries fetched");
        } else {
            warn!(
                groups = dictionaries.groups.len(),
                untranslated = untranslated.len(),
                "dictionary entries without a Russian title"
            );
        }
        Ok(dictionaries)
    }
}
