//! Address + cargo place.
//!
//! The departure address is looked up by a fixed external id and updated if
//! it exists, created otherwise. The cargo place then runs from it to a
//! delivery address that is known to exist. Both saves run as one dependent
//! chain: the cargo place's departure is bound to the address step's
//! external id.

use freightcheck_client::address::UPDATE_PATH;
use freightcheck_client::cargo_place::CREATE_OR_UPDATE_PATH;
use freightcheck_client::{AddressDraft, CargoPlaceDraft, Clients, random};
use freightcheck_core::chain::{Binding, StepSpec, create_dependent_chain};
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::EntityKind;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{ScenarioEnv, ScenarioName, ScenarioOptions, conclude};

pub const DEPARTURE_EXTERNAL_ID: &str = "Izhevsk-SCENARIO-1";
pub const DELIVERY_EXTERNAL_ID: &str = "Izhevsk - Pastuhova - 37";

pub async fn run<T: Transport>(
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    let role = options.role.unwrap_or(Role::Expeditor);
    let clients = env.clients(role).await?;
    let mut ctx = env
        .context(ScenarioName::AddressCargo, role, DEPARTURE_EXTERNAL_ID)
        .await?;

    let outcome = steps(env, &clients, &mut ctx).await;
    conclude(ctx, outcome)
}

async fn steps<T: Transport>(
    env: &ScenarioEnv<T>,
    clients: &Clients<T>,
    ctx: &mut WorkflowContext,
) -> Result<(), FreightcheckError> {
    let address = match clients
        .addresses()
        .find_by_external_id(DEPARTURE_EXTERNAL_ID)
        .await?
    {
        Some(mut existing) => {
            existing.title = Some(format!("Updated {}", random::local_datetime_in(0)));
            info!(external_id = DEPARTURE_EXTERNAL_ID, "departure address exists, updating");
            payload(UPDATE_PATH, &existing)?
        }
        None => {
            info!(external_id = DEPARTURE_EXTERNAL_ID, "departure address missing, creating");
            payload(
                UPDATE_PATH,
                &AddressDraft::random().with_external_id(DEPARTURE_EXTERNAL_ID),
            )?
        }
    };

    let cargo = CargoPlaceDraft::random(env.titles(), DEPARTURE_EXTERNAL_ID, DELIVERY_EXTERNAL_ID)
        .with_external_id(random::external_id("CP"));
    let cargo_external_id = cargo.external_id.clone().unwrap_or_default();

    let chain = [
        StepSpec::new("departure address", EntityKind::Address, UPDATE_PATH, address)
            .with_fallback(DEPARTURE_EXTERNAL_ID),
        StepSpec::new(
            "cargo place",
            EntityKind::CargoPlace,
            CREATE_OR_UPDATE_PATH,
            payload(CREATE_OR_UPDATE_PATH, &cargo)?,
        )
        .bind(Binding::external_id(0, "/departureAddressExternalId"))
        .with_fallback(cargo_external_id),
    ];

    let refs = create_dependent_chain(clients.session(), &chain).await?;
    ctx.record_all(refs);
    ctx.submitted();
    ctx.finish("created");

    Ok(())
}

fn payload<B: Serialize>(path: &str, body: &B) -> Result<Value, FreightcheckError> {
    serde_json::to_value(body).map_err(|e| FreightcheckError::Decode {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}
