//! Scripted API responses.
//!
//! [`logged_in`] returns a mock that accepts logins for every role; the
//! other helpers build the JSON bodies the scenarios expect.

use serde_json::{Value, json};

use freightcheck_core::auth::LOGIN_PATH;
use freightcheck_core::transport::Method;
use freightcheck_core::transport::mock::MockTransport;

pub const TOKEN: &str = "Bearer e2e-token";

/// A mock whose login endpoint succeeds for every role.
pub fn logged_in() -> MockTransport {
    MockTransport::new().on_json(
        Method::Post,
        LOGIN_PATH,
        200,
        json!({"token": TOKEN, "role": 2}),
    )
}

/// `list-info` body with `count` usable points, ids starting at 1.
pub fn points(count: usize) -> Value {
    let points: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "externalId": format!("POINT-{i}"),
                "title": format!("Point {i}"),
                "cityName": "Izhevsk",
                "timezone": "Europe/Samara",
            })
        })
        .collect();
    json!({ "points": points })
}

/// Body returned by create-style endpoints.
pub fn created(id: i64) -> Value {
    json!({ "id": id })
}

/// `list-by-invoice` body listing the given cargo place ids.
pub fn invoice_listing(entries: &[(i64, &str)]) -> Value {
    let cargo_places: Vec<Value> = entries
        .iter()
        .map(|(id, status)| json!({"cargoPlaceId": id, "status": status}))
        .collect();
    json!({ "cargoPlaces": cargo_places })
}

/// Order details whose cargo places refer to `cargo_place_ids`.
pub fn order_details(state: Option<&str>, cargo_place_ids: &[i64]) -> Value {
    let cargo_places: Vec<Value> = cargo_place_ids
        .iter()
        .map(|id| json!({"id": null, "cargoPlaceId": id, "externalId": null}))
        .collect();
    json!({
        "state": state,
        "transportOrder": { "cargoPlaces": cargo_places },
    })
}
