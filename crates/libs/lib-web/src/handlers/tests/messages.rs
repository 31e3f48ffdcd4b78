use axum::http::StatusCode;
use serde_json::{json, Value};

use super::{call, create_conversation, test_app};
use crate::test_support::ScriptedGenerator;

#[tokio::test]
async fn test_send_message_stores_user_message_only() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::replying(&["unused"])).await;
    let id = create_conversation(&app, "Chat").await;

    // Act
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(json!({ "content": "Olá" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["conversationId"], id.as_str());
    assert_eq!(body["userMessage"]["role"], "user");
    assert_eq!(body["userMessage"]["content"], "Olá");
    assert!(body["userMessage"].get("metadata").is_none());

    let (_, conversation) = call(&app, "GET", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(conversation["messageCount"], 1);
}

#[tokio::test]
async fn test_send_message_validation() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    let uri = format!("/api/conversations/{}/messages", id);

    let (status, _) = call(&app, "POST", &uri, Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", &uri, Some(json!({ "content": "a".repeat(5001) }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", &uri, Some(json!({ "text": "wrong field" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", "/api/conversations/missing/messages", Some(json!({ "content": "Oi" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_messages_oldest_first_with_default_limit() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    for content in ["um", "dois", "três"] {
        call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": content }))).await;
    }

    // Act
    let (status, body) = call(&app, "GET", &format!("/api/conversations/{}/messages", id), None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["um", "dois", "três"]);
    assert_eq!(body["pagination"]["limit"], 50);
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_list_messages_second_page() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    for content in ["um", "dois", "três"] {
        call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": content }))).await;
    }

    let (_, body) = call(&app, "GET", &format!("/api/conversations/{}/messages?page=2&limit=2", id), None).await;

    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["content"], "três");
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn test_list_messages_far_page_is_empty_not_an_error() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": "Oi" }))).await;

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages?page=9223372036854775807", id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["messages"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_last_message() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    let uri = format!("/api/conversations/{}/messages/last", id);

    let (status, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": "primeira" }))).await;
    call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": "última" }))).await;

    let (_, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(body["content"], "última");
}

#[tokio::test]
async fn test_delete_message_decrements_count() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Chat").await;
    let (_, sent) = call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": "Oi" }))).await;
    let message_id = sent["userMessage"]["id"].as_str().unwrap().to_string();

    // Act
    let (status, _) = call(&app, "DELETE", &format!("/api/conversations/{}/messages/{}", id, message_id), None).await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, conversation) = call(&app, "GET", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(conversation["messageCount"], 0);

    let (status, _) = call(&app, "DELETE", &format!("/api/conversations/{}/messages/{}", id, message_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
