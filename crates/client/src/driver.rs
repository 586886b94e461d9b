//! Drivers.
//!
//! `POST /driver/create` registers a driver for the caller's organisation.
//! The driver's licence number serves as its external id.

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::random;
use crate::record::string_or_number;

pub const CREATE_PATH: &str = "/driver/create";

const PASSPORT_ISSUED_BY: &str = "МВД России по Ростовской области";

/// Payload for `driver/create`.
///
/// The licence and passport names are the same person; `with_name` keeps
/// them in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDraft {
    pub driver_license_surname: String,
    pub surname: String,
    pub driver_license_name: String,
    pub name: String,
    pub driver_license_patronymic: String,
    pub patronymic: String,
    /// `+7 (9XX) XXX-XX-XX`
    pub application_phone: String,
    pub registration_address: String,
    pub driver_license_id: String,
    pub passport_id: String,
    pub passport_issued_by: String,
    pub can_work_as_loader: bool,
    pub dl_rus_resident: bool,
    pub has_sanitary_book: bool,
    pub never_delegate: bool,
    pub passport_rus_resident: bool,
    pub passport_unit_code: String,
    pub fact_address: String,
    pub contact_phone: String,
    pub inn: String,
    pub date_of_birth: String,
    pub driver_license_date_of_birth: String,
    pub driver_license_expires_at_date: String,
    pub passport_issued_at_date: String,
    pub sanitary_book_expires_at_date: String,
}

impl DriverDraft {
    /// A thirty-year-old resident driver with a valid licence, passport and
    /// sanitary book.
    pub fn random() -> Self {
        let (surname, name, patronymic) = random::driver_name();
        let birth = random::utc_timestamp_in(-(30 * 365 + 7));
        Self {
            driver_license_surname: surname.to_owned(),
            surname: surname.to_owned(),
            driver_license_name: name.to_owned(),
            name: name.to_owned(),
            driver_license_patronymic: patronymic.to_owned(),
            patronymic: patronymic.to_owned(),
            application_phone: random::phone_number(),
            registration_address: format!(
                "ул. Белы Куна д. {} к. {} кв. {}",
                random::int_between(1, 15),
                random::int_between(1, 5),
                random::int_between(1, 150)
            ),
            driver_license_id: random::digits(10),
            passport_id: random::digits(10),
            passport_issued_by: PASSPORT_ISSUED_BY.to_owned(),
            can_work_as_loader: false,
            dl_rus_resident: true,
            has_sanitary_book: true,
            never_delegate: false,
            passport_rus_resident: true,
            passport_unit_code: "111-333".to_owned(),
            fact_address: String::new(),
            contact_phone: String::new(),
            inn: String::new(),
            date_of_birth: birth.clone(),
            driver_license_date_of_birth: birth,
            driver_license_expires_at_date: random::utc_timestamp_in(20 * 365 + 5),
            passport_issued_at_date: random::utc_timestamp_in(-(5 * 365 + 1)),
            sanitary_book_expires_at_date: random::utc_timestamp_in(10 * 365 + 2),
        }
    }

    /// Sets both the licence and passport names.
    pub fn with_name(
        mut self,
        surname: impl Into<String>,
        name: impl Into<String>,
        patronymic: impl Into<String>,
    ) -> Self {
        self.surname = surname.into();
        self.name = name.into();
        self.patronymic = patronymic.into();
        self.driver_license_surname = self.surname.clone();
        self.driver_license_name = self.name.clone();
        self.driver_license_patronymic = self.patronymic.clone();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.application_phone = phone.into();
        self
    }

    pub fn with_license_id(mut self, id: impl Into<String>) -> Self {
        self.driver_license_id = id.into();
        self
    }

    /// The phone as the API stores it: digits only.
    pub fn phone_digits(&self) -> String {
        self.application_phone
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }
}

/// Body returned by `driver/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDriver {
    pub id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub driver_license_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub application_phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreatedDriver {
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            kind: EntityKind::Driver,
            internal_id: self.id,
            external_id: self.driver_license_id.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    /// Whether the stored driver is the one described by `draft`.
    pub fn matches(&self, draft: &DriverDraft) -> bool {
        let flag = |key: &str, expected: bool| self.extra.get(key) == Some(&Value::Bool(expected));
        self.driver_license_id == draft.driver_license_id
            && self.surname.as_deref() == Some(draft.surname.as_str())
            && self.application_phone.as_deref() == Some(draft.phone_digits().as_str())
            && flag("passportRusResident", draft.passport_rus_resident)
            && flag("hasSanitaryBook", draft.has_sanitary_book)
            && flag("dlRusResident", draft.dl_rus_resident)
    }
}

/// Client for driver endpoints.
pub struct DriverClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> DriverClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    pub async fn create(&self, draft: &DriverDraft) -> Result<CreatedDriver, FreightcheckError> {
        let created: CreatedDriver = self.session.post_json(CREATE_PATH, draft).await?;
        info!(
            id = created.id,
            license = %created.driver_license_id,
            status = ?created.status,
            "driver created"
        );
        Ok(created)
    }
}
