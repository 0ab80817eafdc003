//! Common test utilities for API integration tests
//!
//! Builds the real router on top of the database named by `DATABASE_URL`.
//! When it is unset, [`TestContext::new`] returns `None` and tests skip.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kanmind_api::app::{build_router, AppState};
use kanmind_api::config::Config;
use kanmind_shared::db::migrations::run_migrations;
use kanmind_shared::models::user::User;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Router over a pool that never connects
///
/// Good for requests that must be turned away before any query runs.
pub fn router_without_database() -> axum::Router {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgresql://localhost/kanmind_unreachable".to_string()),
        _ => None,
    })
    .expect("Failed to build test config");

    let db = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to create lazy pool");

    build_router(AppState::new(db, config))
}

/// Sends a raw request and returns status plus parsed JSON body (`Null` if empty).
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

/// A registered user and their bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    users: Vec<Uuid>,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty())?;

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(url.clone()),
            "DATABASE_MAX_CONNECTIONS" => Some("5".to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("Failed to connect to test database");
        run_migrations(&db).await.expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self {
            db,
            app,
            users: Vec::new(),
        })
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(&self.app, method, uri, auth, body.map(|b| b.to_string())).await
    }

    /// Registers a fresh user through the API.
    pub async fn register(&mut self, fullname: &str) -> TestUser {
        let email = format!("user-{}@example.com", Uuid::new_v4().simple());

        let (status, body) = self
            .send(
                "POST",
                "/api/registration",
                None,
                Some(json!({
                    "fullname": fullname,
                    "email": email,
                    "password": "Board#Test1",
                    "repeated_password": "Board#Test1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

        let id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();
        self.users.push(id);

        TestUser {
            id,
            email,
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Deletes every user registered through this context.
    pub async fn cleanup(&self) {
        for id in &self.users {
            User::delete(&self.db, *id).await.expect("Failed to delete user");
        }
    }
}
