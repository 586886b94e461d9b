//! FTL request taken by the carrier.
//!
//! The customer publishes an FTL request assigned to the configured carrier's
//! producer. The carrier then takes it, and the customer polls the request
//! details until the status becomes `confirmed`.

use freightcheck_client::delivery_request::CONFIRMED;
use freightcheck_client::{Clients, DeliveryRequestDraft, Point, random};
use freightcheck_core::error::{CorrelationError, FreightcheckError};
use freightcheck_core::poll::poll_until;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};
use tracing::info;

use super::{ScenarioEnv, ScenarioName, ScenarioOptions, conclude};

/// Rate offered to the carrier, in kopecks.
pub const RATE: i64 = 140_000;

pub async fn run<T: Transport>(
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    let role = options.role.unwrap_or(Role::Customer);
    let clients = env.clients(role).await?;
    let client_identifier = random::external_id("LKZ-LKP");
    let mut ctx = env
        .context(ScenarioName::FtlTake, role, client_identifier.as_str())
        .await?;

    let outcome = steps(env, &clients, &mut ctx, client_identifier).await;
    conclude(ctx, outcome)
}

fn point_id(point: &Point) -> Result<i64, CorrelationError> {
    point.id.ok_or_else(|| CorrelationError::MissingInternalId {
        step: "address list".to_owned(),
        field: "id".to_owned(),
    })
}

async fn steps<T: Transport>(
    env: &ScenarioEnv<T>,
    clients: &Clients<T>,
    ctx: &mut WorkflowContext,
    client_identifier: String,
) -> Result<(), FreightcheckError> {
    let (departure, delivery) = clients.addresses().two_valid_points().await?;
    let producer = env.profile(Role::Carrier).producer_id;

    let draft = DeliveryRequestDraft::ftl(point_id(&departure)?, point_id(&delivery)?, producer, RATE)
        .with_client_identifier(client_identifier);
    let published = clients.delivery_requests().create_and_publish(&draft).await?;
    let request_id = published.id;
    ctx.set_correlation_key(published.request_nr.clone());
    ctx.record(published.to_ref());
    ctx.submitted();

    let carrier = env.clients(Role::Carrier).await?;
    carrier.delivery_requests().take(request_id).await?;

    ctx.polling();
    let requests = clients.delivery_requests();
    let details = poll_until(
        env.poll(),
        env.cancel(),
        || requests.details(request_id),
        |details| details.is_confirmed(),
    )
    .await?;
    info!(id = request_id, request_nr = %details.request_nr, "delivery request confirmed");
    ctx.finish(CONFIRMED);

    Ok(())
}
