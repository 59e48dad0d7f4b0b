//! End-to-end tests of the HTTP surface, run on virtual time

mod common;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
};
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

use deferred_hasher::core::jobs::compute_digest;

use common::{call, get, post_password, send, test_app};

const ANGRY_MONKEY_DIGEST: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

#[tokio::test]
async fn test_index_returns_json_welcome() {
    let (_, app) = test_app();

    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["msg"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_hash_lifecycle_angry_monkey() {
    let (_, app) = test_app();

    let (status, id) = post_password(&app, "angryMonkey").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id, "1");

    let (status, body) = get(&app, "/hash/1").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let pending: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(pending["status"], "pending");
    assert_eq!(pending["id"], "1");

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (status, digest) = get(&app, "/hash/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(digest, ANGRY_MONKEY_DIGEST);
}

#[tokio::test]
async fn test_empty_password_is_unprocessable() {
    let (state, app) = test_app();

    let (status, body) = post_password(&app, "").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Missing password"));
    assert_eq!(state.hash_service.store().count(), 0);
}

#[tokio::test]
async fn test_missing_form_is_unprocessable() {
    let (state, app) = test_app();

    let status = call(&app, Method::POST, "/hash").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.hash_service.store().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_password_in_query_string_is_accepted() {
    let (state, app) = test_app();

    let status = call(&app, Method::POST, "/hash?password=angryMonkey").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.hash_service.store().count(), 1);

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (status, digest) = get(&app, "/hash/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(digest, ANGRY_MONKEY_DIGEST);
}

#[tokio::test(start_paused = true)]
async fn test_form_body_wins_over_query_string() {
    let (_, app) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/hash?password=fromQuery")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("password=fromBody"))
        .unwrap();
    let (status, id) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id, "1");

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (_, digest) = get(&app, "/hash/1").await;
    assert_eq!(digest, compute_digest("fromBody"));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (_, app) = test_app();

    let (status, _) = get(&app, "/hash/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_methods_are_rejected() {
    let (_, app) = test_app();

    assert_eq!(call(&app, Method::GET, "/hash").await, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(call(&app, Method::POST, "/hash/1").await, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(call(&app, Method::DELETE, "/stats").await, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(call(&app, Method::POST, "/shutdown").await, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(call(&app, Method::PUT, "/").await, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (_, app) = test_app();

    assert_eq!(call(&app, Method::GET, "/nope").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_start_at_zero() {
    let (_, app) = test_app();

    let (status, body) = get(&app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["average"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_submissions_get_distinct_ids_and_stats() {
    let (_, app) = test_app();

    let responses = join_all((0..100).map(|i| {
        let app = app.clone();
        async move { post_password(&app, &format!("secret-{}", i)).await }
    }))
    .await;

    let ids: HashSet<String> = responses
        .into_iter()
        .map(|(status, id)| {
            assert_eq!(status, StatusCode::OK);
            id
        })
        .collect();
    assert_eq!(ids.len(), 100);
    assert!(ids.contains("1"));
    assert!(ids.contains("100"));

    let (_, body) = get(&app, "/stats").await;
    let stats: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 0);

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 100);
    assert!(stats["average"].as_i64().unwrap() >= 5000);
}

#[tokio::test(start_paused = true)]
async fn test_same_secret_twice_creates_two_jobs_with_equal_digests() {
    let (_, app) = test_app();

    let (_, first) = post_password(&app, "angryMonkey").await;
    let (_, second) = post_password(&app, "angryMonkey").await;
    assert_ne!(first, second);

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (_, a) = get(&app, &format!("/hash/{}", first)).await;
    let (_, b) = get(&app, &format!("/hash/{}", second)).await;
    assert_eq!(a, b);
    assert_eq!(a, ANGRY_MONKEY_DIGEST);
}
