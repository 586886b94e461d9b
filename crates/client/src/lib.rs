//! Typed clients for the logistics REST API.
//!
//! Every client wraps an authorised [`ApiSession`] and is generic over the
//! [`Transport`], so the same code runs against the live API and against
//! `MockTransport` in tests.
//!
//! # Usage
//!
//! ```ignore
//! let cache = CredentialCache::from_config(transport, &config);
//! let clients = Clients::new(cache.session(Role::Expeditor).await?);
//! let (departure, delivery) = clients.addresses().two_valid_points().await?;
//! ```
//!
//! Payload drafts carry randomized defaults from [`random`] and builder-style
//! overrides.

pub mod address;
pub mod cargo_place;
pub mod delivery_request;
pub mod dictionary;
pub mod driver;
pub mod random;
pub mod record;
pub mod shipment_task;
pub mod tariff;
pub mod transport_order;
pub mod vehicle;

use freightcheck_core::session::ApiSession;
use freightcheck_core::transport::Transport;

pub use address::{AddressClient, AddressDraft, Point, PointList};
pub use cargo_place::{
    BatchCargoPlaceDraft, CargoPlaceClient, CargoPlaceDraft, GroupCargoPlace, InvoiceCargoList,
    InvoiceCargoPlace, PlannedPair, ReplaceMethod,
};
pub use delivery_request::{
    DeliveryRequestClient, DeliveryRequestDetails, DeliveryRequestDraft, DraftRequest,
    PublishedRequest, RoutePoint,
};
pub use dictionary::{Dictionaries, DictionaryClient};
pub use driver::{CreatedDriver, DriverClient, DriverDraft};
pub use record::{BatchResponse, CreatedEntity};
pub use shipment_task::{ShipmentTask, ShipmentTaskClient, TaskDraft, TaskId};
pub use tariff::{TariffClient, TariffDetails, TariffList, TariffStatus};
pub use transport_order::{CargoPlaceSpec, OrderDetails, OrderDraft, TransportOrderClient};
pub use vehicle::{CreatedVehicle, TractorDraft, TrailerDraft, VehicleClient, VehicleDraft};

/// All endpoint clients for one role's session.
pub struct Clients<T: Transport> {
    session: ApiSession<T>,
}

impl<T: Transport> Clients<T> {
    pub fn new(session: ApiSession<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ApiSession<T> {
        &self.session
    }

    pub fn addresses(&self) -> AddressClient<T> {
        AddressClient::new(self.session.clone())
    }

    pub fn cargo_places(&self) -> CargoPlaceClient<T> {
        CargoPlaceClient::new(self.session.clone())
    }

    pub fn orders(&self) -> TransportOrderClient<T> {
        TransportOrderClient::new(self.session.clone())
    }

    pub fn delivery_requests(&self) -> DeliveryRequestClient<T> {
        DeliveryRequestClient::new(self.session.clone())
    }

    pub fn shipment_tasks(&self) -> ShipmentTaskClient<T> {
        ShipmentTaskClient::new(self.session.clone())
    }

    pub fn tariffs(&self) -> TariffClient<T> {
        TariffClient::new(self.session.clone())
    }

    pub fn drivers(&self) -> DriverClient<T> {
        DriverClient::new(self.session.clone())
    }

    pub fn vehicles(&self) -> VehicleClient<T> {
        VehicleClient::new(self.session.clone())
    }

    pub fn dictionaries(&self) -> DictionaryClient<T> {
        DictionaryClient::new(self.session.clone())
    }
}
