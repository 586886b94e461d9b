//! invoice-status: cargo place under an invoice, polled via list-by-invoice.

use std::sync::Arc;

use freightcheck_cli::error::CliError;
use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_client::address::LIST_INFO_PATH;
use freightcheck_client::cargo_place::{CREATE_OR_UPDATE_PATH, LIST_BY_INVOICE_PATH};
use freightcheck_client::transport_order::CREATE_PATH;
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::transport::{ApiResponse, Method};
use freightcheck_core::workflow::WorkflowState;

use crate::helpers::env::scenario_env;
use crate::helpers::mock_api;

fn base() -> freightcheck_core::transport::mock::MockTransport {
    mock_api::logged_in()
        .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
        .on_json(Method::Post, CREATE_OR_UPDATE_PATH, 200, mock_api::created(601))
        .on_json(Method::Post, CREATE_PATH, 200, mock_api::created(900))
}

#[tokio::test]
async fn test_e2e_status_reported_once_listed() {
    let transport = Arc::new(base());
    // Not indexed yet, then indexed.
    transport.push(
        Method::Post,
        LIST_BY_INVOICE_PATH,
        ApiResponse::json(200, &mock_api::invoice_listing(&[])),
    );
    transport.push(
        Method::Post,
        LIST_BY_INVOICE_PATH,
        ApiResponse::json(200, &mock_api::invoice_listing(&[(600, "new"), (601, "accepted")])),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::InvoiceStatus, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.final_state, WorkflowState::Terminal("accepted".to_owned()));
    assert!(report.correlation_key.starts_with("INV-"));
    assert_eq!(transport.count(Method::Post, LIST_BY_INVOICE_PATH), 2);

    let order = transport
        .last(Method::Post, CREATE_PATH)
        .and_then(|r| r.body)
        .expect("order created");
    assert_eq!(order["orderIdentifier"], report.correlation_key.as_str());
    assert_eq!(order["cargoPlaces"][0]["cargoPlaceId"], 601);

    let listing = transport
        .last(Method::Post, LIST_BY_INVOICE_PATH)
        .and_then(|r| r.body)
        .expect("listing requested");
    assert_eq!(listing["invoiceNumber"], report.correlation_key.as_str());
}

#[tokio::test]
async fn test_e2e_never_listed_times_out() {
    let transport = Arc::new(base().on_json(
        Method::Post,
        LIST_BY_INVOICE_PATH,
        200,
        mock_api::invoice_listing(&[(600, "new")]),
    ));
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::InvoiceStatus, &env, &ScenarioOptions::default())
        .await
        .expect_err("scenario should time out");

    match &err {
        FreightcheckError::PollTimeout {
            attempts,
            last_observed,
            ..
        } => {
            assert!(*attempts >= 1);
            assert!(last_observed.contains("600"));
        }
        other => panic!("expected poll timeout, got {other:?}"),
    }
    assert_eq!(CliError::from(err).exit_code(), 4);
}
