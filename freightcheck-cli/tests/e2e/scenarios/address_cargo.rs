//! address-cargo: find-or-create the departure address, then a cargo place.

use std::sync::Arc;

use serde_json::json;

use freightcheck_cli::scenarios::address_cargo::{DELIVERY_EXTERNAL_ID, DEPARTURE_EXTERNAL_ID};
use freightcheck_cli::scenarios::{self, ScenarioName, ScenarioOptions};
use freightcheck_client::address::{LIST_INFO_PATH, UPDATE_PATH};
use freightcheck_client::cargo_place::CREATE_OR_UPDATE_PATH;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Method;
use freightcheck_core::types::EntityKind;
use freightcheck_core::workflow::WorkflowState;

use crate::helpers::env::scenario_env;
use crate::helpers::mock_api::{self, TOKEN};

#[tokio::test]
async fn test_e2e_existing_address_is_updated() {
    let transport = Arc::new(
        mock_api::logged_in()
            .on_json(
                Method::Post,
                LIST_INFO_PATH,
                200,
                json!({"points": [
                    {"id": 9, "externalId": "other"},
                    {"id": 15, "externalId": DEPARTURE_EXTERNAL_ID, "title": "Old title"},
                ]}),
            )
            .on_json(Method::Post, UPDATE_PATH, 200, mock_api::created(15))
            .on_json(
                Method::Post,
                CREATE_OR_UPDATE_PATH,
                200,
                json!({"id": 501, "externalId": "CP-FROMAPI"}),
            ),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::AddressCargo, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.role, Role::Expeditor);
    assert_eq!(report.final_state, WorkflowState::Terminal("created".to_owned()));
    assert_eq!(report.entities.len(), 2);
    assert_eq!(report.entities[0].kind, EntityKind::Address);
    assert_eq!(report.entities[0].internal_id, 15);
    assert_eq!(report.entities[0].external_id, DEPARTURE_EXTERNAL_ID);
    assert_eq!(report.entities[1].kind, EntityKind::CargoPlace);
    assert_eq!(report.entities[1].external_id, "CP-FROMAPI");

    let update = transport
        .last(Method::Post, UPDATE_PATH)
        .expect("address update sent");
    let body = update.body.expect("update has a body");
    assert_eq!(body["id"], 15);
    assert_ne!(body["title"], "Old title");
    assert_eq!(update.authorization.as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_e2e_missing_address_is_created() {
    let transport = Arc::new(
        mock_api::logged_in()
            .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
            .on_json(Method::Post, UPDATE_PATH, 200, mock_api::created(77))
            .on_json(Method::Post, CREATE_OR_UPDATE_PATH, 200, mock_api::created(502)),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::AddressCargo, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.entities[0].internal_id, 77);
    let create = transport
        .last(Method::Post, UPDATE_PATH)
        .and_then(|r| r.body)
        .expect("address create sent");
    assert_eq!(create["externalId"], DEPARTURE_EXTERNAL_ID);

    // The cargo place response had no external id; the draft's is used.
    let cargo = &report.entities[1];
    assert_eq!(cargo.internal_id, 502);
    assert!(cargo.external_id.starts_with("CP-"));
}

#[tokio::test]
async fn test_e2e_cargo_place_departure_is_bound_to_saved_address() {
    let transport = Arc::new(
        mock_api::logged_in()
            .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
            .on_json(
                Method::Post,
                UPDATE_PATH,
                200,
                json!({"id": 77, "externalId": "Izhevsk-RENAMED"}),
            )
            .on_json(Method::Post, CREATE_OR_UPDATE_PATH, 200, mock_api::created(503)),
    );
    let env = scenario_env(&transport);

    let report = scenarios::run(ScenarioName::AddressCargo, &env, &ScenarioOptions::default())
        .await
        .expect("scenario should succeed");

    assert_eq!(report.entities[0].external_id, "Izhevsk-RENAMED");
    let cargo = transport
        .last(Method::Post, CREATE_OR_UPDATE_PATH)
        .and_then(|r| r.body)
        .expect("cargo place sent");
    assert_eq!(cargo["departureAddressExternalId"], "Izhevsk-RENAMED");
    assert_eq!(cargo["deliveryAddressExternalId"], DELIVERY_EXTERNAL_ID);
}

#[tokio::test]
async fn test_e2e_cargo_place_rejection_keeps_status_and_body() {
    let transport = Arc::new(
        mock_api::logged_in()
            .on_json(Method::Post, LIST_INFO_PATH, 200, mock_api::points(2))
            .on_json(Method::Post, UPDATE_PATH, 200, mock_api::created(77))
            .on_json(
                Method::Post,
                CREATE_OR_UPDATE_PATH,
                422,
                json!({"errors": {"weight": "must be positive"}}),
            ),
    );
    let env = scenario_env(&transport);

    let err = scenarios::run(ScenarioName::AddressCargo, &env, &ScenarioOptions::default())
        .await
        .expect_err("cargo place creation should fail");

    match err {
        freightcheck_core::error::FreightcheckError::Http { status, body, path, .. } => {
            assert_eq!(status, 422);
            assert_eq!(path, CREATE_OR_UPDATE_PATH);
            assert!(body.contains("must be positive"));
        }
        other => panic!("expected http error, got {other:?}"),
    }
}
