#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use deferred_hasher::{config::Config, routes::create_app, AppState};

/// Test setup: fresh state and the fully layered app built from it
pub fn test_app() -> (AppState, Router) {
    let state = AppState::new(Config::default());
    let app = create_app(state.clone());
    (state, app)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_password(app: &Router, password: &str) -> (StatusCode, String) {
    let body = format!("password={}", password);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/hash")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn call(app: &Router, method: Method, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await.0
}
