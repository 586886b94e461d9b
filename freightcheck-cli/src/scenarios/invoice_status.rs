//! Invoice status.
//!
//! A cargo place is created under a fresh invoice number and put on an order
//! whose identifier is that invoice. `list-by-invoice` is indexed
//! asynchronously, so it is polled until the cargo place shows up.

use freightcheck_client::cargo_place::find_cargo_place;
use freightcheck_client::{CargoPlaceDraft, CargoPlaceSpec, Clients, OrderDraft, random};
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::poll::poll_until;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};
use tracing::info;

use super::{ScenarioEnv, ScenarioName, ScenarioOptions, conclude};

pub async fn run<T: Transport>(
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    let role = options.role.unwrap_or(Role::Expeditor);
    let clients = env.clients(role).await?;
    let invoice = random::invoice_number();
    let mut ctx = env
        .context(ScenarioName::InvoiceStatus, role, invoice.as_str())
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
    let draft = CargoPlaceDraft::random(env.titles(), &departure_ext, &delivery_ext)
        .with_external_id(random::external_id("CP-INV"))
        .with_invoice(invoice);
    let cargo = cargo_places.create_ref(&draft).await?;
    ctx.record(cargo.clone());

    let order_draft = OrderDraft::new(
        &[departure, delivery],
        vec![CargoPlaceSpec::new(&cargo, 1, 2)],
        env.profile(role),
        invoice,
    )?
    .with_comment(format!("Invoice status check {invoice}"));
    let order = clients.orders().create(&order_draft).await?;
    ctx.record(order);
    ctx.submitted();

    ctx.polling();
    let listed = poll_until(
        env.poll(),
        env.cancel(),
        || cargo_places.list_by_invoice(invoice),
        |list| {
            list.cargo_places
                .iter()
                .any(|cp| cp.cargo_place_id == cargo.internal_id)
        },
    )
    .await?;

    let entry = find_cargo_place(listed, invoice, cargo.internal_id)?;
    // Freshly indexed entries may not carry a status yet.
    let status = entry.status.unwrap_or_else(|| "listed".to_owned());
    info!(invoice, cargo_place = cargo.internal_id, status = %status, "cargo place listed under invoice");
    ctx.finish(status);

    Ok(())
}
