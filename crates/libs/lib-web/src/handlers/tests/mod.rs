//! # REST Handler Tests
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`.

mod conversations;
mod messages;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{create_router, AppState};
use crate::test_support::{test_state, ScriptedGenerator};

pub(super) async fn test_app(generator: ScriptedGenerator) -> (Router, AppState) {
    let state = test_state(generator).await;
    (create_router(state.clone()), state)
}

/// Send one request; returns the status and the JSON body (`Null` when empty).
pub(super) async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

/// Create a conversation through the API and return its id.
pub(super) async fn create_conversation(app: &Router, title: &str) -> String {
    let (status, body) = call(app, "POST", "/api/conversations", Some(serde_json::json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}
