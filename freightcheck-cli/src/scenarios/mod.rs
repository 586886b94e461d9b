//! End-to-end scenarios.
//!
//! Each scenario drives one workflow through the typed clients, tracks it in
//! a [`WorkflowContext`] and returns the resulting [`ScenarioReport`].
//! Nothing is rolled back: entities created before a failure stay on the
//! remote side and are listed in the failure log.

pub mod address_cargo;
pub mod ftl_take;
pub mod invoice_status;
pub mod mass_orders;
pub mod replace_planned;

use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use freightcheck_client::Clients;
use freightcheck_core::auth::CredentialCache;
use freightcheck_core::config::FreightcheckConfig;
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::poll::PollPolicy;
use freightcheck_core::role::{Role, RoleDirectory, RoleProfile};
use freightcheck_core::sequence::TitleSequence;
use freightcheck_core::transport::Transport;
use freightcheck_core::workflow::{ScenarioReport, WorkflowContext};

/// Available scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioName {
    /// Find or create a departure address, then create a cargo place from it.
    AddressCargo,
    /// Cargo place under an invoice plus an order, polled via list-by-invoice.
    InvoiceStatus,
    /// Replace planned cargo places on an order with actual ones.
    ReplacePlanned,
    /// Customer publishes an FTL request, carrier takes it.
    FtlTake,
    /// Many cargo places grouped four per order.
    MassOrders,
}

impl ScenarioName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddressCargo => "address-cargo",
            Self::InvoiceStatus => "invoice-status",
            Self::ReplacePlanned => "replace-planned",
            Self::FtlTake => "ftl-take",
            Self::MassOrders => "mass-orders",
        }
    }
}

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOptions {
    /// Primary role; each scenario has its own default.
    pub role: Option<Role>,
    /// Item count for scenarios that create many entities.
    pub count: Option<usize>,
}

/// Everything a scenario needs besides its options.
pub struct ScenarioEnv<T: Transport> {
    cache: Arc<CredentialCache<T>>,
    roles: RoleDirectory,
    poll: PollPolicy,
    titles: TitleSequence,
    cancel: CancellationToken,
}

impl<T: Transport> ScenarioEnv<T> {
    pub fn new(
        cache: Arc<CredentialCache<T>>,
        roles: RoleDirectory,
        poll: PollPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            cache,
            roles,
            poll,
            titles: TitleSequence::default(),
            cancel,
        }
    }

    /// Builds the environment with a fresh credential cache over `transport`.
    pub fn from_config(
        transport: Arc<T>,
        config: &FreightcheckConfig,
        cancel: CancellationToken,
    ) -> Self {
        let cache = Arc::new(CredentialCache::from_config(transport, config));
        Self::new(cache, config.roles.clone(), config.poll_policy(), cancel)
    }

    /// Replaces the cargo place title sequence.
    pub fn with_titles(mut self, titles: TitleSequence) -> Self {
        self.titles = titles;
        self
    }

    pub fn cache(&self) -> &CredentialCache<T> {
        &self.cache
    }

    pub fn profile(&self, role: Role) -> &RoleProfile {
        self.roles.profile(role)
    }

    pub fn poll(&self) -> &PollPolicy {
        &self.poll
    }

    pub fn titles(&self) -> &TitleSequence {
        &self.titles
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Clients authorised as `role`, logging in on first use.
    pub async fn clients(&self, role: Role) -> Result<Clients<T>, FreightcheckError> {
        Ok(Clients::new(self.cache.session(role).await?))
    }

    /// A workflow context for `role`'s current credential.
    pub async fn context(
        &self,
        name: ScenarioName,
        role: Role,
        correlation_key: impl Into<String>,
    ) -> Result<WorkflowContext, FreightcheckError> {
        let credential = self.cache.get_credential(role).await?;
        Ok(WorkflowContext::new(
            name.as_str(),
            role,
            credential,
            correlation_key,
        ))
    }
}

/// Runs one scenario.
pub async fn run<T: Transport>(
    name: ScenarioName,
    env: &ScenarioEnv<T>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, FreightcheckError> {
    info!(scenario = name.as_str(), role = ?options.role, "scenario starting");
    let report = match name {
        ScenarioName::AddressCargo => address_cargo::run(env, options).await,
        ScenarioName::InvoiceStatus => invoice_status::run(env, options).await,
        ScenarioName::ReplacePlanned => replace_planned::run(env, options).await,
        ScenarioName::FtlTake => ftl_take::run(env, options).await,
        ScenarioName::MassOrders => mass_orders::run(env, options).await,
    }?;
    info!(
        scenario = name.as_str(),
        final_state = %report.final_state,
        entities = report.entities.len(),
        elapsed_ms = report.elapsed_ms,
        "scenario finished"
    );
    Ok(report)
}

/// Turns the outcome of a scenario body into its report or error.
pub(crate) fn conclude(
    mut ctx: WorkflowContext,
    outcome: Result<(), FreightcheckError>,
) -> Result<ScenarioReport, FreightcheckError> {
    match outcome {
        Ok(()) => Ok(ctx.report()),
        Err(e) => {
            let e = ctx.fail(e);
            let created: Vec<String> = ctx.entities().iter().map(ToString::to_string).collect();
            warn!(
                scenario = ctx.name(),
                state = %ctx.state(),
                correlation_key = ctx.correlation_key(),
                created = ?created,
                "scenario failed, created entities are left in place"
            );
            Err(e)
        }
    }
}
