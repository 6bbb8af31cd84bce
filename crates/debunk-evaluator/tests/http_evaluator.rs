//! Integration tests for [`HttpEvaluator`] against a local Axum server.
//!
//! Each test binds a throwaway scoring service on `127.0.0.1:0` and points
//! the evaluator at it.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use debunk_core::Evaluator;
use debunk_core::config::EvaluatorConfig;
use debunk_evaluator::{EvaluatorError, HttpEvaluator};
use debunk_types::EvaluationResult;
use serde_json::{Value, json};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}/")
}

fn evaluator(url: String, timeout_ms: u64) -> HttpEvaluator {
    HttpEvaluator::new(&EvaluatorConfig { url, timeout_ms }).unwrap()
}

#[tokio::test]
async fn scores_from_service_are_returned() {
    let url = serve(Router::new().route(
        "/",
        post(|Json(body): Json<Value>| async move {
            // Echo a score that proves the request carried theme and input.
            let ok = body["theme"] == "flat_earth" && body["input"] == "ships vanish hull first";
            Json(json!({"persuasive": if ok { 4 } else { 0 }, "empathy": 2}))
        }),
    ))
    .await;

    let result = evaluator(url, 2_000)
        .evaluate("flat_earth", "ships vanish hull first")
        .await;
    assert_eq!(result, EvaluationResult::new(4, 2));
}

#[tokio::test]
async fn out_of_range_scores_are_clamped() {
    let url = serve(Router::new().route(
        "/",
        post(|| async { Json(json!({"persuasive": 9, "empathy": -3})) }),
    ))
    .await;

    let result = evaluator(url, 2_000).evaluate("t", "x").await;
    assert_eq!(result, EvaluationResult::new(5, 0));
}

#[tokio::test]
async fn server_error_scores_zero() {
    let url = serve(Router::new().route(
        "/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    let http = evaluator(url, 2_000);
    assert!(matches!(
        http.try_evaluate("t", "x").await,
        Err(EvaluatorError::Status(StatusCode::INTERNAL_SERVER_ERROR))
    ));
    assert_eq!(http.evaluate("t", "x").await, EvaluationResult::ZERO);
}

#[tokio::test]
async fn non_json_body_scores_zero() {
    let url = serve(Router::new().route("/", post(|| async { "persuasive: 5" }))).await;

    let http = evaluator(url, 2_000);
    assert!(matches!(
        http.try_evaluate("t", "x").await,
        Err(EvaluatorError::Json(_))
    ));
    assert_eq!(http.evaluate("t", "x").await, EvaluationResult::ZERO);
}

#[tokio::test]
async fn missing_field_scores_zero() {
    let url = serve(Router::new().route(
        "/",
        post(|| async { Json(json!({"persuasive": 5})) }),
    ))
    .await;

    assert_eq!(
        evaluator(url, 2_000).evaluate("t", "x").await,
        EvaluationResult::ZERO
    );
}

#[tokio::test]
async fn slow_service_times_out_to_zero() {
    let url = serve(Router::new().route(
        "/",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"persuasive": 5, "empathy": 5}))
        }),
    ))
    .await;

    let http = evaluator(url, 200);
    assert!(matches!(
        http.try_evaluate("t", "x").await,
        Err(EvaluatorError::Transport(_))
    ));
}

#[tokio::test]
async fn unreachable_service_scores_zero() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = evaluator(format!("http://{addr}/"), 1_000)
        .evaluate("t", "x")
        .await;
    assert_eq!(result, EvaluationResult::ZERO);
}

#[tokio::test]
async fn failure_does_not_poison_later_calls() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = std::sync::Arc::clone(&calls);
    let url = serve(Router::new().route(
        "/",
        post(move || {
            let counter = std::sync::Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Err(StatusCode::BAD_GATEWAY)
                } else {
                    Ok(Json(json!({"persuasive": 2, "empathy": 3})))
                }
            }
        }),
    ))
    .await;

    let http = evaluator(url, 2_000);
    assert_eq!(http.evaluate("t", "first").await, EvaluationResult::ZERO);
    assert_eq!(http.evaluate("t", "second").await, EvaluationResult::new(2, 3));
}
