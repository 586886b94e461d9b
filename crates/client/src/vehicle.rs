//! Vehicles: rigid trucks, tractor units and trailers.
//!
//! Each has its own create endpoint. Trucks and trailers come back as a bare
//! object; a tractor comes back wrapped in `{"tractor": {...}}`. The plate
//! number serves as the external id.

use freightcheck_core::error::FreightcheckError;
use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::random;

pub const VEHICLE_CREATE_PATH: &str = "/vehicle/create";
pub const TRACTOR_CREATE_PATH: &str = "/tractor/create";
pub const TRAILER_CREATE_PATH: &str = "/trailer/create";

const TRUCK_MODELS: [&str; 6] = [
    "KAMAZ 65117",
    "GAZ Valdai",
    "MAN TGL 12.250",
    "Volvo FL",
    "Isuzu Elf 7.5",
    "Hino 500",
];

const TRACTOR_MODELS: [&str; 6] = [
    "KAMAZ 5490 Neo",
    "Volvo FH 460",
    "Scania R450",
    "MAN TGX 18.510",
    "DAF XF 480",
    "Sitrak C7H",
];

const TRAILER_BRANDS: [&str; 8] = [
    "Schmitz Cargobull",
    "Krone",
    "Wielton",
    "Fruehauf",
    "Ron Schlepper",
    "Bergkamp",
    "Cimolai",
    "Tabou",
];

fn pick(choices: &[&'static str]) -> String {
    random::pick(choices, "").to_owned()
}

/// Payload for `vehicle/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    pub create_vehicle: bool,
    pub plate_number: String,
    pub mark_and_model: String,
    pub year_of_manufacture: i64,
    pub owner_type: i64,
    pub category: Vec<i64>,
    pub body_type: i64,
    /// The capacities travel as decimal strings.
    pub lifting_capacity_in_kg: String,
    pub lifting_capacity_min: String,
    pub lifting_capacity_max: String,
    /// m³
    pub volume: i64,
    pub pallets_capacity: i64,
    pub has_sanitary_passport: bool,
    pub sanitary_passport_expires_at_date: String,
    pub vin: Option<String>,
    pub geozone_passes: Vec<Value>,
    pub photo_files: Vec<Value>,
}

impl VehicleDraft {
    /// A 100 t box truck with room for 35 pallets.
    pub fn random() -> Self {
        Self {
            create_vehicle: true,
            plate_number: format!("AUTO_{}", random::plate_suffix(5)),
            mark_and_model: pick(&TRUCK_MODELS),
            year_of_manufacture: 2020,
            owner_type: 1,
            category: vec![1],
            body_type: 3,
            lifting_capacity_in_kg: "100000".to_owned(),
            lifting_capacity_min: "100".to_owned(),
            lifting_capacity_max: "100000".to_owned(),
            volume: 120,
            pallets_capacity: 35,
            has_sanitary_passport: true,
            sanitary_passport_expires_at_date: "2031-10-24".to_owned(),
            vin: None,
            geozone_passes: Vec::new(),
            photo_files: Vec::new(),
        }
    }

    pub fn with_plate_number(mut self, plate: impl Into<String>) -> Self {
        self.plate_number = plate.into();
        self
    }

    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = volume;
        self
    }
}

/// Payload for `tractor/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractorDraft {
    pub create_vehicle: bool,
    pub plate_number: String,
    pub mark_and_model: String,
    pub year_of_manufacture: i64,
    pub owner_type: i64,
    pub is_car_transporter_covered: bool,
}

impl TractorDraft {
    pub fn random() -> Self {
        Self {
            create_vehicle: true,
            plate_number: format!("TRACTOR_{}", random::plate_suffix(5)),
            mark_and_model: pick(&TRACTOR_MODELS),
            year_of_manufacture: random::int_between(2010, 2024),
            owner_type: 1,
            is_car_transporter_covered: false,
        }
    }

    pub fn with_plate_number(mut self, plate: impl Into<String>) -> Self {
        self.plate_number = plate.into();
        self
    }
}

/// Payload for `trailer/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailerDraft {
    pub create_vehicle: bool,
    pub plate_number: String,
    pub mark_and_model: String,
    pub year_of_manufacture: i64,
    pub owner_type: i64,
    pub category: Vec<i64>,
    pub body_type: i64,
    pub lifting_capacity_in_kg: String,
    pub lifting_capacity_min: String,
    pub lifting_capacity_max: String,
    pub is_rear_loading_available: Option<bool>,
    pub is_side_loading_available: Option<bool>,
    pub is_top_loading_available: Option<bool>,
    pub height_from_ground_in_cm: i64,
    pub platform_height: i64,
    pub platform_length: i64,
    pub has_sanitary_passport: bool,
    pub sanitary_passport_expires_at_date: String,
    pub vin: Option<String>,
    pub geozone_passes: Vec<Value>,
    pub photo_files: Vec<Value>,
}

impl TrailerDraft {
    /// A 20 t rear-loading semi-trailer with a Russian plate.
    pub fn random() -> Self {
        let model = format!(
            "{} {}{:02}",
            pick(&TRAILER_BRANDS),
            random::plate_suffix(3),
            random::int_between(0, 99)
        );
        Self {
            create_vehicle: true,
            plate_number: random::trailer_plate(),
            mark_and_model: model,
            year_of_manufacture: random::int_between(2000, 2020),
            owner_type: 1,
            category: vec![9],
            body_type: 10,
            lifting_capacity_in_kg: "20000".to_owned(),
            lifting_capacity_min: "100".to_owned(),
            lifting_capacity_max: "25000".to_owned(),
            is_rear_loading_available: Some(true),
            is_side_loading_available: None,
            is_top_loading_available: None,
            height_from_ground_in_cm: 300,
            platform_height: 150,
            platform_length: 1000,
            has_sanitary_passport: true,
            sanitary_passport_expires_at_date: "2030-10-01".to_owned(),
            vin: None,
            geozone_passes: Vec::new(),
            photo_files: Vec::new(),
        }
    }

    pub fn with_plate_number(mut self, plate: impl Into<String>) -> Self {
        self.plate_number = plate.into();
        self
    }
}

/// A created truck, tractor or trailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedVehicle {
    pub id: i64,
    pub plate_number: String,
    #[serde(default)]
    pub mark_and_model: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreatedVehicle {
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            kind: EntityKind::Vehicle,
            internal_id: self.id,
            external_id: self.plate_number.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }
}

#[derive(Debug, Deserialize)]
struct TractorEnvelope {
    tractor: CreatedVehicle,
}

/// Client for vehicle endpoints.
pub struct VehicleClient<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> VehicleClient<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    pub async fn create_vehicle(
        &self,
        draft: &VehicleDraft,
    ) -> Result<CreatedVehicle, FreightcheckError> {
        let created: CreatedVehicle = self.session.post_json(VEHICLE_CREATE_PATH, draft).await?;
        info!(id = created.id, plate = %created.plate_number, "vehicle created");
        Ok(created)
    }

    pub async fn create_tractor(
        &self,
        draft: &TractorDraft,
    ) -> Result<CreatedVehicle, FreightcheckError> {
        let envelope: TractorEnvelope = self.session.post_json(TRACTOR_CREATE_PATH, draft).await?;
        info!(id = envelope.tractor.id, plate = %envelope.tractor.plate_number, "tractor created");
        Ok(envelope.tractor)
    }

    pub async fn create_trailer(
        &self,
        draft: &TrailerDraft,
    ) -> Result<CreatedVehicle, FreightcheckError> {
        let created: CreatedVehicle = self.session.post_json(TRAILER_CREATE_PATH, draft).await?;
        info!(id = created.id, plate = %created.plate_number, "trailer created");
        Ok(created)
    }
}
