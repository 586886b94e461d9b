//! ftl-take: customer publishes an FTL request, carrier takes it.

use std::sync::Arc;

use serde_json::json;

use freightcheck_cli::error::CliError;
use freightcheck_cli::scenarios::ftl_take::RATE;
use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_client::address::LIST_INFO_PATH;
use freightcheck_client::delivery_request::{CREATE_AND_PUBLISH_PATH, details_path, take_path};
use freightcheck_core::auth::LOGIN_PATH;
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::role::Role;
use freightcheck_core::transport::mock::MockTransport;
use freightcheck_core::transport::{ApiResponse, Method};
use freightcheck_core::types::EntityKind;
use freightcheck_core::workflow::WorkflowState;

use crate::helpers::env::{CARRIER_PRODUCER_ID, scenario_env};
use crate::helpers::mock_api;

const REQUEST_ID: i64 = 77;

fn details(status: &str) -> serde_json::Value {
    json!({"id": REQUEST_ID, "requestNr": "REQ-000077", "status": status, "deliverySubType": "ftl"})
}

fn published() -> MockTransport {
    mock_api::logged_in()
        .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
        .on_json(
            Method::Post,
            CREATE_AND_PUBLISH_PATH,
            200,
            json!({"id": REQUEST_ID, "requestNr": "REQ-000077", "status": "published"}),
        )
}

#[tokio::test]
async fn test_e2e_taken_request_becomes_confirmed() {
    let transport = Arc::new(published().on_json(Method::Get, &take_path(REQUEST_ID), 200, json!({})));
    transport.push(
        Method::Get,
        &details_path(REQUEST_ID),
        ApiResponse::json(200, &details("published")),
    );
    transport.push(
        Method::Get,
        &details_path(REQUEST_ID),
        ApiResponse::json(200, &details("confirmed")),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::FtlTake, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.role, Role::Customer);
    assert_eq!(report.correlation_key, "REQ-000077");
    assert_eq!(report.final_state, WorkflowState::Terminal("confirmed".to_owned()));
    assert_eq!(report.entities.len(), 1);
    assert_eq!(report.entities[0].kind, EntityKind::DeliveryRequest);
    assert_eq!(report.entities[0].internal_id, REQUEST_ID);

    let draft = transport
        .last(Method::Post, CREATE_AND_PUBLISH_PATH)
        .and_then(|r| r.body)
        .expect("request published");
    assert_eq!(draft["deliverySubType"], "ftl");
    let share = &draft["parametersForProducers"]["shares"][0];
    assert_eq!(share["producer"], CARRIER_PRODUCER_ID);
    assert_eq!(share["rate"], RATE);
    assert!(
        draft["clientIdentifier"]
            .as_str()
            .is_some_and(|id| id.starts_with("LKZ-LKP-"))
    );

    // One login per role: customer and carrier.
    assert_eq!(transport.count(Method::Post, LOGIN_PATH), 2);
    assert_eq!(transport.count(Method::Get, &take_path(REQUEST_ID)), 1);
}

#[tokio::test]
async fn test_e2e_take_rejected_fails_without_polling() {
    let transport = Arc::new(published().on_json(
        Method::Get,
        &take_path(REQUEST_ID),
        403,
        json!({"error": "not assigned to this carrier"}),
    ));
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::FtlTake, &env, &ScenarioOptions::default())
        .await
        .expect_err("take should fail");

    assert!(matches!(err, FreightcheckError::Http { status: 403, .. }));
    assert_eq!(transport.count(Method::Get, &details_path(REQUEST_ID)), 0);
    assert_eq!(CliError::from(err).exit_code(), 1);
}

#[tokio::test]
async fn test_e2e_unconfirmed_request_times_out() {
    let transport = Arc::new(
        published()
            .on_json(Method::Get, &take_path(REQUEST_ID), 200, json!({}))
            .on_json(Method::Get, &details_path(REQUEST_ID), 200, details("published")),
    );
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::FtlTake, &env, &ScenarioOptions::default())
        .await
        .expect_err("request never confirmed");

    assert!(matches!(err, FreightcheckError::PollTimeout { .. }));
    assert!(err.to_string().contains("published"));
}
