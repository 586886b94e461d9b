//! Planned → actual cargo place replacement.
//!
//! Two planned cargo places (no invoice) go on an order; two actual ones are
//! created under the order's invoice. After the replacement the order
//! details are polled until one of its cargo places points at an actual
//! cargo place through `cargoPlaceId`.

use freightcheck_client::{CargoPlaceDraft, CargoPlaceSpec, Clients, OrderDraft, random};
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::poll::poll_until;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;
use freightcheck_core::types::EntityRef;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};
use tracing::info;

use super::{ScenarioEnv, ScenarioName, ScenarioOptions, conclude};

const PAIRS: usize = 2;

pub async fn run<T: Transport>(
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    let role = options.role.unwrap_or(Role::Expeditor);
    let clients = env.clients(role).await?;
    let invoice = random::invoice_number();
    let mut ctx = env
        .context(ScenarioName::ReplacePlanned, role, invoice.as_str())
        .await?;

    let outcome = steps(env, &clients, &mut ctx, role, &invoice).await;
    conclude(ctx, outcome)
}

async fn steps<T: Transport>(
    env: &ScenarioEnv<T>,
    clients: &Clients<T>,
    ctx: &mut WorkflowContext,
    role: Role,
    invoice: &str,
) -> Result<(), FreightcheckError> {
    let (departure, delivery) = clients.addresses().two_valid_points().await?;
    let departure_ext = departure.external_id.clone().unwrap_or_default();
    let delivery_ext = delivery.external_id.clone().unwrap_or_default();
    let cargo_places = clients.cargo_places();

    let draft = |title: String, ext: String| {
        CargoPlaceDraft::random(env.titles(), &departure_ext, &delivery_ext)
            .with_title(title)
            .with_external_id(ext)
            .with_weight_kg(50.0)
            .with_volume_m3(0.5)
    };

    let mut planned: Vec<EntityRef> = Vec::with_capacity(PAIRS);
    for i in 1..=PAIRS {
        let cargo = cargo_places
            .create_ref(&draft(format!("Planned {i}"), random::external_id("PLANNED")))
            .await?;
        planned.push(cargo);
    }

    let mut actual: Vec<EntityRef> = Vec::with_capacity(PAIRS);
    for i in 1..=PAIRS {
        let cargo = cargo_places
            .create_ref(
                &draft(format!("Actual {i}"), random::external_id("ACTUAL")).with_invoice(invoice),
            )
            .await?;
        actual.push(cargo);
    }
    ctx.record_all(planned.iter().cloned());
    ctx.record_all(actual.iter().cloned());

    let specs = planned
        .iter()
        .map(|cargo| CargoPlaceSpec::new(cargo, 1, 2))
        .collect();
    let order_draft = OrderDraft::new(&[departure, delivery], specs, env.profile(role), invoice)?
        .with_comment(format!("Planned cargo place replacement ({})", role.key()));
    let orders = clients.orders();
    let order = orders.create(&order_draft).await?;
    let order_id = order.internal_id;
    ctx.record(order);

    let (method, _) = cargo_places
        .replace_with_fallback(&planned, &actual, false)
        .await?;
    info!(order_id, method = ?method, "planned cargo places replaced");
    ctx.submitted();

    ctx.polling();
    let actual_ids: Vec<i64> = actual.iter().map(|cargo| cargo.internal_id).collect();
    poll_until(
        env.poll(),
        env.cancel(),
        || orders.details(order_id),
        |details| details.references_any(&actual_ids),
    )
    .await?;
    ctx.finish("replaced");

    Ok(())
}
