//! API integration tests.
//!
//! Every test drives the full router against a fresh in-memory database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use school_api::{AppState, router as api_router};
use school_db::test_utils::TestDatabase;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Create the test router over a migrated database.
async fn create_test_router() -> Router {
    let db = TestDatabase::in_memory().await.unwrap();
    api_router().with_state(AppState::new(db.shared()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Send a request without a body or a `Content-Type` header.
async fn send_bare(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create(app: &Router, uri: &str, body: Value) -> String {
    let (status, json) = send(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router().await;

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_create_class_and_reject_duplicate() {
    let app = create_test_router().await;

    let (status, json) = send(
        &app,
        "POST",
        "/classes",
        Some(json!({"name": "Eight", "medium": "BANGLA"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "Eight");
    assert_eq!(json["data"]["isActive"], true);
    assert_eq!(json["data"]["_count"]["sections"], 0);

    let (status, json) = send(&app, "POST", "/classes", Some(json!({"name": "Eight"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "DUPLICATE");

    let (_, json) = send(&app, "GET", "/classes", None).await;
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_invalid_json_returns_error_envelope() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/classes")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_blank_name_is_validation_error() {
    let app = create_test_router().await;

    let (status, json) = send(&app, "POST", "/departments", Some(json!({"name": ""}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_class_returns_404() {
    let app = create_test_router().await;

    let (status, json) = send(&app, "GET", "/classes/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_paginates_and_filters_inactive() {
    let app = create_test_router().await;
    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        ids.push(create(&app, "/classes", json!({"name": name})).await);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/classes/bulk-update",
        Some(json!({"ids": [ids[0]], "isActive": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/classes?page=1&limit=2", None).await;
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["pages"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (_, json) = send(&app, "GET", "/classes?includeInactive=false", None).await;
    assert_eq!(json["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_bulk_update_reports_missing_ids() {
    let app = create_test_router().await;
    let id = create(&app, "/departments", json!({"name": "Science"})).await;

    let (status, json) = send(
        &app,
        "POST",
        "/departments/bulk-update",
        Some(json!({"ids": [id, "ghost"], "isActive": false})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "IDS_NOT_FOUND");
    assert_eq!(json["error"]["ids"], json!(["ghost"]));

    let (_, json) = send(&app, "GET", &format!("/departments/{id}"), None).await;
    assert_eq!(json["data"]["isActive"], true);
}

#[tokio::test]
async fn test_class_department_setup_and_reset() {
    let app = create_test_router().await;
    let eight = create(&app, "/classes", json!({"name": "Eight"})).await;
    let science = create(&app, "/departments", json!({"name": "Science"})).await;

    let (status, json) = send(
        &app,
        "POST",
        "/departments/class-setup",
        Some(json!({
            "classId": eight,
            "departments": [{"departmentId": science, "isActive": true}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let link_id = json["data"][0]["id"].clone();

    let (_, json) = send(&app, "GET", &format!("/departments/class-setup/{eight}"), None).await;
    assert_eq!(json["data"]["class"]["name"], "Eight");
    assert_eq!(json["data"]["departments"][0]["isActive"], true);

    let (_, json) = send(&app, "GET", &format!("/departments/by-class/{eight}"), None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        "POST",
        &format!("/departments/class-reset/{eight}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 1);

    let (_, json) = send(
        &app,
        "POST",
        "/departments/class-setup",
        Some(json!({
            "classId": eight,
            "departments": [{"departmentId": science, "isActive": false}]
        })),
    )
    .await;
    assert_eq!(json["data"][0]["id"], link_id);
    assert_eq!(json["data"][0]["isActive"], false);
}

#[tokio::test]
async fn test_section_identity_and_delete_guard() {
    let app = create_test_router().await;
    let eight = create(&app, "/classes", json!({"name": "Eight"})).await;
    let science = create(&app, "/departments", json!({"name": "Science"})).await;

    let section = create(
        &app,
        "/sections",
        json!({"name": "A", "classId": eight, "departmentId": science}),
    )
    .await;

    let (status, json) = send(
        &app,
        "POST",
        "/sections",
        Some(json!({"name": "A", "classId": eight, "departmentId": science})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "DUPLICATE");

    create(&app, "/sections", json!({"name": "A", "classId": eight})).await;

    create(
        &app,
        "/students",
        json!({"firstName": "Nadia", "sectionId": section}),
    )
    .await;

    let (status, json) = send(&app, "DELETE", &format!("/sections/{section}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "HAS_DEPENDENTS");

    let (status, json) = send(&app, "GET", &format!("/sections/{section}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["_count"]["students"], 1);
}

#[tokio::test]
async fn test_section_with_unknown_class_is_invalid_reference() {
    let app = create_test_router().await;

    let (status, json) = send(
        &app,
        "POST",
        "/sections",
        Some(json!({"name": "A", "classId": "ghost"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn test_patch_section_clears_department() {
    let app = create_test_router().await;
    let nine = create(&app, "/classes", json!({"name": "Nine"})).await;
    let science = create(&app, "/departments", json!({"name": "Science"})).await;
    let section = create(
        &app,
        "/sections",
        json!({"name": "A", "classId": nine, "departmentId": science}),
    )
    .await;

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/sections/{section}"),
        Some(json!({"departmentId": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["departmentId"], Value::Null);
}

#[tokio::test]
async fn test_delete_empty_class() {
    let app = create_test_router().await;
    let id = create(&app, "/classes", json!({"name": "Play"})).await;

    let (status, _) = send(&app, "DELETE", &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_setup_wizard_sections() {
    let app = create_test_router().await;
    let one = create(&app, "/classes", json!({"name": "One"})).await;

    let (status, json) = send(
        &app,
        "POST",
        "/setup/sections/save",
        Some(json!({
            "classId": one,
            "sectionConfigs": [
                {"name": "A", "isActive": true},
                {"name": "B", "isActive": false}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 2);

    let (_, json) = send(&app, "GET", &format!("/setup/sections?classId={one}"), None).await;
    let sections = json["data"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1]["isActive"], false);

    let (status, json) = send(
        &app,
        "POST",
        "/setup/sections/reset",
        Some(json!({"classId": one})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 2);
}

#[tokio::test]
async fn test_setup_wizard_classes_by_medium() {
    let app = create_test_router().await;
    create(&app, "/classes", json!({"name": "One"})).await;
    create(
        &app,
        "/classes",
        json!({"name": "Standard 1", "medium": "ENGLISH"}),
    )
    .await;

    let (_, json) = send(&app, "GET", "/setup/classes?medium=ENGLISH", None).await;
    let classes = json["data"].as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["name"], "Standard 1");

    let (status, json) = send_bare(&app, "POST", "/setup/classes/reset?medium=ENGLISH").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 1);

    let (_, json) = send(&app, "GET", "/classes/by-medium?includeInactive=false", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router().await;

    let (status, _) = send(&app, "GET", "/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_class_reset_without_body() {
    let app = create_test_router().await;
    create(&app, "/classes", json!({"name": "One"})).await;
    create(
        &app,
        "/classes",
        json!({"name": "Standard 1", "medium": "ENGLISH"}),
    )
    .await;

    let (status, json) = send_bare(&app, "POST", "/classes/reset?medium=BANGLA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 1);

    let (status, json) = send_bare(&app, "POST", "/classes/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["affected"], 2);

    let (_, json) = send(&app, "GET", "/classes?includeInactive=false", None).await;
    assert_eq!(json["pagination"]["total"], 0);
}
