use axum::http::StatusCode;
use serde_json::json;

use super::{call, create_conversation, test_app};
use crate::test_support::ScriptedGenerator;

#[tokio::test]
async fn test_create_with_title() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::default()).await;

    // Act
    let (status, body) = call(&app, "POST", "/api/conversations", Some(json!({ "title": "Debate" }))).await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Debate");
    assert_eq!(body["messageCount"], 0);
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn test_create_without_body_uses_dated_title() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;

    let (status, body) = call(&app, "POST", "/api/conversations", None).await;

    assert_eq!(status, StatusCode::CREATED);
    let title = body["title"].as_str().unwrap();
    assert!(title.starts_with("Conversa "), "got {}", title);
    assert!(title.contains(" às "));
}

#[tokio::test]
async fn test_create_rejects_long_title_and_unknown_fields() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;

    let (status, body) = call(&app, "POST", "/api/conversations", Some(json!({ "title": "x".repeat(201) }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidInput");

    let (status, _) = call(&app, "POST", "/api/conversations", Some(json!({ "name": "nope" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_conversation_is_404() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;

    let (status, body) = call(&app, "GET", "/api/conversations/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Conversation missing not found");
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn test_list_paginates_and_filters_by_status() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let first = create_conversation(&app, "Primeira").await;
    create_conversation(&app, "Segunda").await;
    create_conversation(&app, "Terceira").await;
    let (status, _) = call(&app, "PATCH", &format!("/api/conversations/{}/archive", first), None).await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, page) = call(&app, "GET", "/api/conversations?page=1&limit=2", None).await;
    let (_, archived) = call(&app, "GET", "/api/conversations?status=archived", None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["conversations"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["hasNextPage"], true);
    assert_eq!(page["pagination"]["hasPreviousPage"], false);

    let archived = archived["conversations"].as_array().unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0]["id"], first.as_str());
}

#[tokio::test]
async fn test_list_clamps_limit_and_rejects_bad_status() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    create_conversation(&app, "Única").await;

    let (status, body) = call(&app, "GET", "/api/conversations?page=0&limit=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["conversations"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "GET", "/api/conversations?status=deleted", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_count_active_and_archived() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let first = create_conversation(&app, "A").await;
    create_conversation(&app, "B").await;
    call(&app, "PATCH", &format!("/api/conversations/{}/archive", first), None).await;

    let (status, body) = call(&app, "GET", "/api/conversations/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "totalActive": 1, "totalArchived": 1, "total": 2 }));
}

#[tokio::test]
async fn test_update_title() {
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Old").await;

    let (status, body) = call(
        &app,
        "PATCH",
        &format!("/api/conversations/{}/title", id),
        Some(json!({ "title": "  New  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New");

    let (status, _) = call(&app, "PATCH", &format!("/api/conversations/{}/title", id), Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_conversation_removes_messages() {
    // Arrange
    let (app, _) = test_app(ScriptedGenerator::default()).await;
    let id = create_conversation(&app, "Doomed").await;
    call(&app, "POST", &format!("/api/conversations/{}/messages", id), Some(json!({ "content": "Oi" }))).await;

    // Act
    let (status, body) = call(&app, "DELETE", &format!("/api/conversations/{}", id), None).await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);
    let (status, _) = call(&app, "GET", &format!("/api/conversations/{}/messages", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "DELETE", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
