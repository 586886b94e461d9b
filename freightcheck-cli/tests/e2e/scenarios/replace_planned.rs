//! replace-planned: planned cargo places on an order replaced by actual ones.

use std::sync::Arc;

use serde_json::json;

use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_client::address::LIST_INFO_PATH;
use freightcheck_client::cargo_place::{CREATE_OR_UPDATE_PATH, REPLACE_PLANNED_PAIRS_PATH};
use freightcheck_client::transport_order::{CREATE_PATH, details_path};
use freightcheck_core::error::FreightcheckError;
use freightcheck_core::transport::mock::MockTransport;
use freightcheck_core::transport::{ApiResponse, Method};
use freightcheck_core::types::EntityKind;
use freightcheck_core::workflow::WorkflowState;

use crate::helpers::env::scenario_env;
use crate::helpers::mock_api;

const ORDER_ID: i64 = 910;

/// Planned cargo places get ids 11 and 12, actual ones 21 and 22.
fn scripted() -> MockTransport {
    let transport = mock_api::logged_in()
        .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
        .on_json(Method::Post, CREATE_PATH, 200, mock_api::created(ORDER_ID));
    for id in [11, 12, 21, 22] {
        transport.push(
            Method::Post,
            CREATE_OR_UPDATE_PATH,
            ApiResponse::json(200, &mock_api::created(id)),
        );
    }
    transport
}

#[tokio::test]
async fn test_e2e_replaced_by_internal_id() {
    let transport = Arc::new(scripted().on_json(Method::Post, REPLACE_PLANNED_PAIRS_PATH, 200, json!([])));
    transport.push(
        Method::Get,
        &details_path(ORDER_ID),
        ApiResponse::json(200, &mock_api::order_details(Some("new"), &[11, 12])),
    );
    transport.push(
        Method::Get,
        &details_path(ORDER_ID),
        ApiResponse::json(200, &mock_api::order_details(Some("new"), &[21, 22])),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::ReplacePlanned, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.final_state, WorkflowState::Terminal("replaced".to_owned()));
    let cargo_ids: Vec<i64> = report
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::CargoPlace)
        .map(|e| e.internal_id)
        .collect();
    assert_eq!(cargo_ids, vec![11, 12, 21, 22]);

    // The order only carries the planned cargo places.
    let order = transport
        .last(Method::Post, CREATE_PATH)
        .and_then(|r| r.body)
        .expect("order created");
    assert_eq!(order["cargoPlaces"][0]["cargoPlaceId"], 11);
    assert_eq!(order["cargoPlaces"][1]["cargoPlaceId"], 12);
    assert_eq!(order["orderIdentifier"], report.correlation_key.as_str());

    let replace = transport
        .last(Method::Post, REPLACE_PLANNED_PAIRS_PATH)
        .and_then(|r| r.body)
        .expect("replacement sent");
    assert_eq!(replace["items"][0]["plannedId"], 11);
    assert_eq!(replace["items"][0]["cargoPlaceId"], 21);
    assert_eq!(transport.count(Method::Post, REPLACE_PLANNED_PAIRS_PATH), 1);
}

#[tokio::test]
async fn test_e2e_falls_back_to_external_ids() {
    let transport = Arc::new(
        scripted().on_json(
            Method::Get,
            &details_path(ORDER_ID),
            200,
            mock_api::order_details(Some("new"), &[22]),
        ),
    );
    transport.push(
        Method::Post,
        REPLACE_PLANNED_PAIRS_PATH,
        ApiResponse::json(400, &json!({"error": "unknown plannedId"})),
    );
    transport.push(
        Method::Post,
        REPLACE_PLANNED_PAIRS_PATH,
        ApiResponse::json(200, &json!([])),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::ReplacePlanned, &env, &ScenarioOptions::default())
        .await
        .expect("fallback should succeed");

    assert_eq!(report.final_state, WorkflowState::Terminal("replaced".to_owned()));
    assert_eq!(transport.count(Method::Post, REPLACE_PLANNED_PAIRS_PATH), 2);
    let retry = transport
        .last(Method::Post, REPLACE_PLANNED_PAIRS_PATH)
        .and_then(|r| r.body)
        .expect("retry sent");
    assert!(retry["items"][0].get("plannedId").is_none());
}

#[tokio::test]
async fn test_e2e_both_replacements_rejected() {
    let transport = Arc::new(scripted().on_json(
        Method::Post,
        REPLACE_PLANNED_PAIRS_PATH,
        409,
        json!({"error": "order locked"}),
    ));
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::ReplacePlanned, &env, &ScenarioOptions::default())
        .await
        .expect_err("replacement should fail");

    assert!(matches!(err, FreightcheckError::Http { status: 409, .. }));
    assert_eq!(transport.count(Method::Post, REPLACE_PLANNED_PAIRS_PATH), 2);
    assert_eq!(transport.count(Method::Get, &details_path(ORDER_ID)), 0);
}
