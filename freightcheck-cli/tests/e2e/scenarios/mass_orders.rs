//! mass-orders: many cargo places grouped four per order.

use std::sync::Arc;

use freightcheck_cli::error::CliError;
use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_client::address::LIST_INFO_PATH;
use freightcheck_client::cargo_place::CREATE_OR_UPDATE_PATH;
use freightcheck_client::transport_order::{CREATE_PATH, details_path};
use freightcheck_core::error::CorrelationError;
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::transport::Method;
use freightcheck_core::types::EntityKind;
use freightcheck_core::workflow::WorkflowState;

use crate::helpers::env::scenario_env;
use crate::helpers::mock_api;

#[tokio::test]
async fn test_e2e_cargo_places_grouped_per_order() {
    let transport = Arc::new(
        mock_api::logged_in()
            .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(5))
            .on_json(Method::Post, CREATE_OR_UPDATE_PATH, 200, mock_api::created(700))
            .on_json(Method::Post, CREATE_PATH, 200, mock_api::created(950))
            .on_json(
                Method::Get,
                &details_path(950),
                200,
                mock_api::order_details(Some("new"), &[700]),
            ),
    );
    let env = scenario_env(&transport);
    let options = ScenarioOptions {
        role: None,
        count: Some(6),
    };

    let report = scenarios::run(ScenarioName::MassOrders, &env, &options)
        .await
        .expect("scenario should succeed");

    assert_eq!(report.final_state, WorkflowState::Terminal("state reported".to_owned()));
    assert_eq!(transport.count(Method::Post, CREATE_OR_UPDATE_PATH), 6);
    assert_eq!(transport.count(Method::Post, CREATE_PATH), 2);
    let orders = report
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::TransportOrder)
        .count();
    assert_eq!(orders, 2);

    // The last order holds the remaining two cargo places.
    let last = transport
        .last(Method::Post, CREATE_PATH)
        .and_then(|r| r.body)
        .expect("order created");
    let cargo_places = last["cargoPlaces"].as_array().expect("cargo places");
    assert_eq!(cargo_places.len(), 2);
    assert_eq!(cargo_places[0]["departurePointPosition"], 1);
    assert_eq!(cargo_places[1]["arrivalPointPosition"], 3);
    assert_eq!(last["addresses"].as_array().map(Vec::len), Some(5));
    assert!(
        last["orderIdentifier"]
            .as_str()
            .is_some_and(|id| id.starts_with("MASS-2-"))
    );
}

#[tokio::test]
async fn test_e2e_too_few_addresses() {
    let transport = Arc::new(
        mock_api::logged_in().on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(3)),
    );
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::MassOrders, &env, &ScenarioOptions::default())
        .await
        .expect_err("five addresses are required");

    assert!(matches!(
        err,
        FreightcheckError::Correlation(CorrelationError::NotFound { .. })
    ));
    assert_eq!(transport.count(Method::Post, CREATE_OR_UPDATE_PATH), 0);
}

#[tokio::test]
async fn test_e2e_zero_count_is_rejected_before_any_call() {
    let transport = Arc::new(mock_api::logged_in());
    let env = scenario_env(&transport);
    let options = ScenarioOptions {
        role: None,
        count: Some(0),
    };

    let err = scenarios::run(ScenarioName::MassOrders, &env, &options)
        .await
        .expect_err("zero count is invalid");

    assert!(transport.requests().is_empty());
    assert_eq!(CliError::from(err).exit_code(), 2);
}
