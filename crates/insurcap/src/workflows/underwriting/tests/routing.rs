use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::underwriting::router::{analyze_handler, exposure_handler};
use crate::workflows::underwriting::{underwriting_router, ExposureRequest, UnderwritingRequest};

fn post_json(uri: &str, body: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("build request")
}

#[tokio::test]
async fn analyze_route_returns_composite_report() {
    let router = underwriting_router(Arc::new(pipeline()));

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/analyze",
            &json!({ "request": FLOOD_REQUEST, "location": "Kranj" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["category"], json!("nepremičninsko"));
    assert_eq!(payload["premium"], json!(457.5));
    assert_eq!(payload["terms"]["duration"], json!("1 leto"));
    assert_eq!(payload["weather_impact"]["location"], json!("Kranj"));
}

#[tokio::test]
async fn exposure_route_accepts_mixed_factor_values() {
    let router = underwriting_router(Arc::new(pipeline()));

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/exposure",
            &json!({
                "policy_type": "življenjsko",
                "factors": { "starost": 150, "poklic": "rizični", "zdravstveno_stanje": "dobro" }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["exposure_score"], json!(0.69));
    assert_eq!(payload["risk_factors"][0]["severity"], json!("high"));
}

#[tokio::test]
async fn malformed_json_is_rejected_by_the_extractor() {
    let router = underwriting_router(Arc::new(pipeline()));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/underwriting/analyze")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{\"request\":"))
                .expect("build request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_handler_reports_failing_stage() {
    let response = analyze_handler(
        State(Arc::new(pipeline())),
        axum::Json(UnderwritingRequest::text(" \t ")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stage"], json!("classifier"));
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("blank"));
}

#[tokio::test]
async fn analyze_handler_maps_source_outage_to_bad_gateway() {
    let pipeline = pipeline_with(
        Arc::new(FixedCarbon::new(1_000.0)),
        Arc::new(UnreachableWeather),
    );

    let response =
        analyze_handler(State(Arc::new(pipeline)), axum::Json(UnderwritingRequest::text(FLOOD_REQUEST)))
            .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stage"], json!("impact"));
}

#[tokio::test]
async fn exposure_handler_rejects_non_finite_values() {
    let request = ExposureRequest {
        policy_type: policy("zdravstveno"),
        factors: [("starost".to_string(), f64::INFINITY.into())]
            .into_iter()
            .collect(),
    };

    let response = exposure_handler(State(Arc::new(pipeline())), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stage"], json!("exposure"));
}
