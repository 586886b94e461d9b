//! Login failures stop a scenario before any workflow call.

use std::sync::Arc;

use serde_json::json;

use freightcheck_cli::error::CliError;
use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_core::auth::LOGIN_PATH;
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Method;
use freightcheck_core::transport::mock::MockTransport;

use crate::helpers::env::scenario_env;

#[tokio::test]
async fn test_e2e_rejected_login_maps_to_exit_code_3() {
    let transport = Arc::new(MockTransport::new().on_json(
        Method::Post,
        LOGIN_PATH,
        401,
        json!({"error": "invalid credentials"}),
    ));
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::InvoiceStatus, &env, &ScenarioOptions::default())
        .await
        .expect_err("login should fail");

    assert!(matches!(err, FreightcheckError::Auth(_)));
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(CliError::from(err).exit_code(), 3);
}

#[tokio::test]
async fn test_e2e_failed_login_is_not_retried_in_the_same_run() {
    let transport = Arc::new(MockTransport::new().on_json(
        Method::Post,
        LOGIN_PATH,
        403,
        json!({"error": "blocked"}),
    ));
    let env = scenario_env(&transport);
    let options = ScenarioOptions {
        role: Some(Role::Carrier),
        count: None,
    };

    for _ in 0..2 {
        let err = scenarios::run(ScenarioName::AddressCargo, &env, &options)
            .await
            .expect_err("login should fail");
        assert!(err.to_string().contains("403"));
    }
    assert_eq!(transport.count(Method::Post, LOGIN_PATH), 1);
}
