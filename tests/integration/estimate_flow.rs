//! End-to-end behaviour of `POST /estimate` against the mock LLM.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use medcost::config::{CacheConfig, EvictionKind};
use medcost::engine::estimator::Estimator;
use medcost::server::build_router;
use medcost::server::routes::ServerState;

use crate::mock_llm::{MockLlm, Reply};

fn app_with(llm: &MockLlm, cache: CacheConfig) -> Router {
    let estimator = Estimator::new(Arc::new(llm.clone()), &cache);
    build_router(Arc::new(ServerState::new(estimator)))
}

fn app(llm: &MockLlm) -> Router {
    app_with(llm, CacheConfig::default())
}

async fn post(app: &Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

async fn post_raw(app: &Router, body: String) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/estimate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn flu() -> Value {
    json!({"procedure": "Flu Shot", "zip_code": "10001", "procedure_code": ""})
}

#[tokio::test]
async fn sample_estimate_is_normalized() {
    let llm = MockLlm::with_sample_estimate();
    let (status, body) = post(&app(&llm), flu()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["low_estimate"], 20.0);
    assert_eq!(body["high_estimate"], 75.5);
    assert_eq!(body["typical_insurance_cost"], 0.0);
    assert_eq!(
        body["common_complications"],
        json!([
            {"name": "Soreness at injection site", "estimated_cost": 0.0},
            {"name": "Allergic reaction", "estimated_cost": 0.0},
            {"name": "Fever", "estimated_cost": null}
        ])
    );
    assert_eq!(
        body["alternative_procedures"][1]["estimated_cost_range"],
        json!([50.0, null])
    );
    assert_eq!(
        body["recovery_info"],
        json!({"estimated_time": "None", "associated_costs": null})
    );
}

#[tokio::test]
async fn repeat_request_served_from_cache() {
    let llm = MockLlm::with_sample_estimate();
    let app = app(&llm);

    let (_, first) = post(&app, flu()).await;
    let (_, second) = post(&app, flu()).await;

    assert_eq!(llm.calls(), 1);
    assert_eq!(first.to_string(), second.to_string());
}

#[tokio::test]
async fn prompt_carries_request_details() {
    let llm = MockLlm::replying("{}");
    let app = app(&llm);

    post(
        &app,
        json!({"procedure": "Root Canal", "zip_code": "73301", "procedure_code": "D3330"}),
    )
    .await;
    post(&app, json!({"procedure": "Ear Tubes", "zip_code": "73301"})).await;

    let prompts = llm.prompts();
    assert!(prompts[0].contains("Root Canal in ZIP code 73301"));
    assert!(prompts[0].contains("The procedure code is D3330."));
    assert!(prompts[0].contains("molars vs. front teeth"));
    assert!(prompts[1].contains("common variations, potential complications"));
    assert!(!prompts[1].contains("procedure code is"));
}

#[tokio::test]
async fn eviction_after_capacity_forces_second_call() {
    let llm = MockLlm::with_sample_estimate();
    let app = app_with(
        &llm,
        CacheConfig {
            capacity: 3,
            eviction: EvictionKind::Insertion,
            cache_failures: true,
        },
    );

    for zip in ["10001", "10002", "10003", "10004"] {
        post(&app, json!({"procedure": "Flu Shot", "zip_code": zip})).await;
    }
    assert_eq!(llm.calls(), 4);

    // Still cached.
    post(&app, json!({"procedure": "Flu Shot", "zip_code": "10004"})).await;
    assert_eq!(llm.calls(), 4);

    // Earliest key was evicted.
    post(&app, json!({"procedure": "Flu Shot", "zip_code": "10001"})).await;
    assert_eq!(llm.calls(), 5);
}

#[tokio::test]
async fn upstream_errors_map_to_messages() {
    let cases = [
        (Reply::Body("I think it costs about $50".into()), "Unable to parse the estimate. Please try again."),
        (Reply::RateLimited, "Rate limit exceeded. Please try again later."),
        (Reply::ServerError, "An error occurred while fetching the estimate. Please try again."),
        (Reply::Empty, "An unexpected error occurred while estimating the cost. Please try again."),
    ];

    for (reply, message) in cases {
        let llm = MockLlm::with_sample_estimate();
        llm.set_reply(reply);
        let (status, body) = post(&app(&llm), flu()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": message }));
    }
}

#[tokio::test]
async fn cached_failure_is_replayed() {
    let llm = MockLlm::with_sample_estimate();
    llm.set_reply(Reply::RateLimited);
    let app = app(&llm);

    post(&app, flu()).await;
    llm.set_reply(Reply::Body("{}".into()));
    let (_, body) = post(&app, flu()).await;

    assert_eq!(llm.calls(), 1);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn validation_never_reaches_llm() {
    let llm = MockLlm::with_sample_estimate();
    let app = app(&llm);

    let (status, body) = post(&app, json!({"procedure": "MRI Scan"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing procedure or ZIP code"}));

    let (status, body) = post_raw(&app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request data"}));

    let (status, _) = post_raw(&app, String::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn stats_track_hits_and_misses() {
    let llm = MockLlm::with_sample_estimate();
    let app = app(&llm);
    post(&app, flu()).await;
    post(&app, flu()).await;

    let resp = app
        .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
    let stats: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(stats["cache_hits"], 1);
    assert_eq!(stats["cache_misses"], 1);
    assert_eq!(stats["cache_entries"], 1);
    assert_eq!(stats["llm_calls"], 1);
}
