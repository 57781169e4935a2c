//! HTTP round trips through the router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use production_planner::api::{self, error::ErrorResponse, AppState};
use production_planner::config::Config;

fn app() -> Router {
    api::router(AppState::new(Config::default()))
}

async fn post_plan(body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/productionplan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn plan(bytes: &[u8]) -> Vec<(String, f64)> {
    let entries: Vec<Value> = serde_json::from_slice(bytes).unwrap();
    entries
        .into_iter()
        .map(|e| (e["name"].as_str().unwrap().to_string(), e["p"].as_f64().unwrap()))
        .collect()
}

fn payload(load: f64, wind: f64, plants: Value) -> String {
    json!({
        "load": load,
        "fuels": {
            "gas(euro/MWh)": 13.4,
            "kerosine(euro/MWh)": 50.8,
            "co2(euro/ton)": 20,
            "wind(%)": wind
        },
        "powerplants": plants
    })
    .to_string()
}

#[tokio::test]
async fn test_payload1_plan() {
    let (status, body) = post_plan(include_str!("../payloads/payload1.json")).await;
    assert_eq!(status, StatusCode::OK);

    let plan = plan(&body);
    let names: Vec<&str> = plan.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "gasfiredbig1",
            "gasfiredbig2",
            "gasfiredsomewhatsmaller",
            "tj1",
            "windpark1",
            "windpark2"
        ]
    );
    assert_eq!(plan[0].1, 368.4);
    assert_eq!(plan[4].1, 90.0);
    assert_eq!(plan[5].1, 21.6);
}

#[tokio::test]
async fn test_payload2_plan() {
    let (status, body) = post_plan(include_str!("../payloads/payload2.json")).await;
    assert_eq!(status, StatusCode::OK);

    let plan = plan(&body);
    assert_eq!(plan[0], ("gasfiredbig1".to_string(), 380.0));
    assert_eq!(plan[1], ("gasfiredbig2".to_string(), 100.0));
    assert!(plan[2..].iter().all(|(_, p)| *p == 0.0));
}

#[tokio::test]
async fn test_payload3_plan() {
    let (status, body) = post_plan(include_str!("../payloads/payload3.json")).await;
    assert_eq!(status, StatusCode::OK);

    let plan = plan(&body);
    let total: f64 = plan.iter().map(|(_, p)| p).sum();
    assert!((total - 910.0).abs() <= 0.1);
    assert_eq!(plan[1], ("gasfiredbig2".to_string(), 338.4));
}

#[tokio::test]
async fn test_infeasible_load_is_unprocessable() {
    let body = payload(
        80.0,
        100.0,
        json!([
            {"name": "gas", "type": "gasfired", "efficiency": 0.5, "pmin": 100, "pmax": 200},
            {"name": "wind", "type": "windturbine", "efficiency": 1, "pmin": 0, "pmax": 50}
        ]),
    );
    let (status, body) = post_plan(body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "InfeasibleDemand");
    assert!(error.message.contains("80"));
}

#[tokio::test]
async fn test_unknown_plant_type_is_bad_request() {
    let body = payload(
        50.0,
        60.0,
        json!([
            {"name": "pv1", "type": "solar", "efficiency": 1, "pmin": 0, "pmax": 100}
        ]),
    );
    let (status, body) = post_plan(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "UnknownUnitKind");
    assert!(error.message.contains("solar"));
}

#[tokio::test]
async fn test_validation_failures_are_bad_request() {
    let plant = json!({"name": "gas", "type": "gasfired", "efficiency": 0.5, "pmin": 0, "pmax": 100});

    let cases = [
        payload(0.0, 60.0, json!([plant.clone()])),
        payload(50.0, 120.0, json!([plant.clone()])),
        payload(50.0, 60.0, json!([])),
        payload(50.0, 60.0, json!([plant.clone(), plant.clone()])),
        payload(
            50.0,
            60.0,
            json!([{"name": "gas", "type": "gasfired", "efficiency": 0.5, "pmin": 200, "pmax": 100}]),
        ),
        payload(
            50.0,
            60.0,
            json!([{"name": "gas", "type": "gasfired", "efficiency": 0.0, "pmin": 0, "pmax": 100}]),
        ),
    ];

    for body in cases {
        let (status, response) = post_plan(body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}", body);
        let error: ErrorResponse = serde_json::from_slice(&response).unwrap();
        assert_eq!(error.error, "ValidationError");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post_plan("{\"load\": 480,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "BadRequest");
}

#[tokio::test]
async fn test_health_endpoints() {
    for uri in ["/healthz", "/health/live", "/health/ready"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let ready: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ready["strategy"], "first_feasible");
}
