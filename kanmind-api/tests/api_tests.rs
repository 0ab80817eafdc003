//! End-to-end tests for the HTTP surface
//!
//! Run with: DATABASE_URL=postgresql://localhost/kanmind_test cargo test -p kanmind-api

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

macro_rules! context_or_skip {
    () => {
        match TestContext::new().await {
            Some(ctx) => ctx,
            None => {
                eprintln!("DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

#[tokio::test]
async fn test_health_endpoint() {
    let ctx = context_or_skip!();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
    assert!(body["schema_version"].as_i64().is_some());
}

#[tokio::test]
async fn test_registration_then_login_returns_same_token() {
    let mut ctx = context_or_skip!();
    let user = ctx.register("Ada Lovelace").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": user.email.to_uppercase(), "password": "Board#Test1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], user.token.as_str());
    assert_eq!(body["fullname"], "Ada Lovelace");

    let (status, body) = ctx
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": user.email, "password": "Wrong#Pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_credentials");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_registration_reports_field_errors() {
    let ctx = context_or_skip!();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/registration",
            None,
            Some(json!({
                "fullname": "Mononym",
                "email": "not-an-email",
                "password": "weak",
                "repeated_password": "weaker"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"fullname"));
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let ctx = context_or_skip!();

    let (status, body) = ctx.send("GET", "/api/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx
        .send("GET", "/api/boards", Some("Bearer kmt_doesnotexist"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.send("GET", "/api/boards", Some("Basic abc"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_board_lifecycle() {
    let mut ctx = context_or_skip!();
    let owner = ctx.register("Olivia Owner").await;
    let member = ctx.register("Max Member").await;

    let (status, board) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&owner.auth_header()),
            Some(json!({ "title": "Launch", "members": [member.id] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let board_id = board["id"].as_str().unwrap().to_string();
    assert_eq!(board["owner_id"], owner.id.to_string());

    let (status, list) = ctx
        .send("GET", "/api/boards", Some(&member.auth_header()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == board_id.as_str()));

    let (status, detail) = ctx
        .send(
            "PATCH",
            &format!("/api/boards/{}", board_id),
            Some(&member.auth_header()),
            Some(json!({ "title": "Launch v2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Launch v2");
    assert_eq!(detail["members"].as_array().unwrap().len(), 1);

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/api/boards/{}", board_id),
            Some(&owner.auth_header()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx
        .send(
            "GET",
            &format!("/api/boards/{}", board_id),
            Some(&owner.auth_header()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_stranger_is_forbidden() {
    let mut ctx = context_or_skip!();
    let owner = ctx.register("Olivia Owner").await;
    let stranger = ctx.register("Sam Stranger").await;

    let (_, board) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&owner.auth_header()),
            Some(json!({ "title": "Private" })),
        )
        .await;
    let board_id = board["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "GET",
            &format!("/api/boards/{}", board_id),
            Some(&stranger.auth_header()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&stranger.auth_header()),
            Some(json!({ "board": board_id, "title": "Sneaky" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_with_outside_assignee_is_rejected() {
    let mut ctx = context_or_skip!();
    let owner = ctx.register("Olivia Owner").await;
    let outsider = ctx.register("Oscar Outsider").await;

    let (_, board) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&owner.auth_header()),
            Some(json!({ "title": "Roadmap" })),
        )
        .await;
    let board_id = board["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&owner.auth_header()),
            Some(json!({
                "board": board_id,
                "title": "Ship it",
                "assignee_id": outsider.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, task) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&owner.auth_header()),
            Some(json!({
                "board": board_id,
                "title": "Ship it",
                "priority": "high",
                "assignee_id": owner.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "to-do");
    assert_eq!(task["priority"], "high");

    let (status, mine) = ctx
        .send("GET", "/api/tasks/assigned-to-me", Some(&owner.auth_header()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(mine.as_array().unwrap().iter().any(|t| t["id"] == task["id"]));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_only_author_deletes_comment() {
    let mut ctx = context_or_skip!();
    let owner = ctx.register("Olivia Owner").await;
    let member = ctx.register("Max Member").await;

    let (_, board) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&owner.auth_header()),
            Some(json!({ "title": "Team", "members": [member.id] })),
        )
        .await;
    let (_, task) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&owner.auth_header()),
            Some(json!({ "board": board["id"], "title": "Discuss" })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, comment) = ctx
        .send(
            "POST",
            &format!("/api/tasks/{}/comments", task_id),
            Some(&owner.auth_header()),
            Some(json!({ "content": "  First!  " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "First!");
    let comment_uri = format!("/api/tasks/{}/comments/{}", task_id, comment["id"].as_str().unwrap());

    let (status, _) = ctx
        .send("DELETE", &comment_uri, Some(&member.auth_header()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send("DELETE", &comment_uri, Some(&owner.auth_header()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let mut ctx = context_or_skip!();
    let user = ctx.register("Paula Parser").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&user.auth_header()),
            Some(json!({ "members": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .send("GET", "/api/boards/not-a-uuid", Some(&user.auth_header()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_stranger_gets_forbidden_before_field_errors() {
    let mut ctx = context_or_skip!();
    let owner = ctx.register("Olivia Owner").await;
    let stranger = ctx.register("Sam Stranger").await;

    let (_, board) = ctx
        .send(
            "POST",
            "/api/boards",
            Some(&owner.auth_header()),
            Some(json!({ "title": "Private" })),
        )
        .await;
    let (_, task) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&owner.auth_header()),
            Some(json!({ "board": board["id"], "title": "Hidden" })),
        )
        .await;
    let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = ctx
        .send("PATCH", &task_uri, Some(&stranger.auth_header()), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("details").is_none());

    let (status, _) = ctx
        .send(
            "POST",
            &format!("{}/comments", task_uri),
            Some(&stranger.auth_header()),
            Some(json!({ "content": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send("PATCH", &task_uri, Some(&owner.auth_header()), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "title");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_registration_without_confirmation_is_field_error() {
    let ctx = context_or_skip!();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/registration",
            None,
            Some(json!({
                "fullname": "Ada Lovelace",
                "email": format!("confirm-{}@example.com", uuid::Uuid::new_v4().simple()),
                "password": "Board#Test1"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "password");
}
