//! Scenario environment builder for E2E tests.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use freightcheck_cli::scenarios::ScenarioEnv;
use freightcheck_core::auth::CredentialCache;
use freightcheck_core::poll::PollPolicy;
use freightcheck_core::role::{Role, RoleDirectory};
use freightcheck_core::transport::mock::MockTransport;

/// Producer id configured for the carrier role.
pub const CARRIER_PRODUCER_ID: i64 = 4242;

/// Role directory with credentials and party ids for every role.
pub fn roles() -> RoleDirectory {
    let mut roles = RoleDirectory::default();
    for role in Role::ALL {
        let profile = roles.profile_mut(role);
        profile.email = format!("{}@example.com", role.key());
        profile.password = "secret".to_owned();
        profile.client_id = 100;
        profile.producer_id = 200;
        profile.contract_id = 300;
    }
    roles.lkp.producer_id = CARRIER_PRODUCER_ID;
    roles
}

/// Polling fast enough for tests while still allowing a few attempts.
pub fn fast_poll() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(300), Duration::from_millis(10))
}

/// Builds a scenario environment over `transport`.
pub fn scenario_env(transport: &Arc<MockTransport>) -> ScenarioEnv<MockTransport> {
    let cache = Arc::new(CredentialCache::new(Arc::clone(transport), roles()));
    ScenarioEnv::new(cache, roles(), fast_poll(), CancellationToken::new())
}
