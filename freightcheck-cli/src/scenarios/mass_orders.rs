//! Mass order creation.
//!
//! Creates `count` cargo places over a five-point route and groups them four
//! per transport order: every cargo place loads at the first point and
//! unloads at the point matching its slot in the group. Each order is then
//! polled until its details report a state.

use freightcheck_client::{CargoPlaceDraft, CargoPlaceSpec, Clients, OrderDraft, Point, random};
use freightcheck_core::error::{ConfigError, FreightcheckError};
use freightcheck_core::poll::poll_until;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::EntityRef;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};
use tracing::{debug, info};

use super::{ScenarioEnv, ScenarioName, ScenarioOptions, conclude};

pub const DEFAULT_COUNT: usize = 20;
pub const ROUTE_POINTS: usize = 5;
pub const PER_ORDER: usize = ROUTE_POINTS - 1;

pub async fn run<T: Transport>(
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    let count = options.count.unwrap_or(DEFAULT_COUNT);
    if count == 0 {
        return Err(ConfigError::InvalidValue {
            field: "count".to_owned(),
            reason: "must be at least 1".to_owned(),
        }
        .into());
    }

    let role = options.role.unwrap_or(Role::Expeditor);
    let clients = env.clients(role).await?;
    let batch = random::short_id();
    let mut ctx = env
        .context(ScenarioName::MassOrders, role, format!("MASS-{batch}"))
        .await?;

    let outcome = steps(env, &clients, &mut ctx, role, count, &batch).await;
    conclude(ctx, outcome)
}

async fn steps<T: Transport>(
    env: &ScenarioEnv<T>,
    clients: &Clients<T>,
    ctx: &mut WorkflowContext,
    role: Role,
    count: usize,
    batch: &str,
) -> Result<(), FreightcheckError> {
    let route = clients.addresses().usable_points(ROUTE_POINTS).await?;
    let external_ids: Vec<String> = route
        .iter()
        .map(|p: &Point| p.external_id.clone().unwrap_or_default())
        .collect();

    let cargo_places = clients.cargo_places();
    let mut created: Vec<EntityRef> = Vec::with_capacity(count);
    for i in 0..count {
        let slot = i % PER_ORDER;
        let draft = CargoPlaceDraft::random(env.titles(), &external_ids[0], &external_ids[slot + 1])
            .with_external_id(random::external_id("CP"))
            .with_weight_kg(50.0)
            .with_volume_m3(0.5);
        let cargo = cargo_places.create_ref(&draft).await?;
        debug!(index = i, id = cargo.internal_id, "cargo place created");
        ctx.record(cargo.clone());
        created.push(cargo);
    }
    info!(count, "cargo places created");

    let orders = clients.orders();
    let mut order_ids = Vec::with_capacity(created.len().div_ceil(PER_ORDER));
    for (i, group) in created.chunks(PER_ORDER).enumerate() {
        let specs = group
            .iter()
            .zip(2u32..)
            .map(|(cargo, arrival)| CargoPlaceSpec::new(cargo, 1, arrival))
            .collect();
        let draft = OrderDraft::new(&route, specs, env.profile(role), format!("MASS-{}-{batch}", i + 1))?
            .with_comment(format!("Mass order {} of batch {batch}", i + 1));
        let order = orders.create(&draft).await?;
        order_ids.push(order.internal_id);
        ctx.record(order);
    }
    info!(orders = order_ids.len(), "transport orders created");
    ctx.submitted();

    ctx.polling();
    for order_id in order_ids {
        let details = poll_until(
            env.poll(),
            env.cancel(),
            || orders.details(order_id),
            |details| details.state.is_some(),
        )
        .await?;
        info!(order_id, state = ?details.state, "order state reported");
    }
    ctx.finish("state reported");

    Ok(())
}
