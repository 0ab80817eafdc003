/// Token authentication middleware for Axum
///
/// Resolves the `Authorization` header to a user and stores the result as an
/// [`AuthContext`] request extension.
///
/// # Accepted schemes
///
/// - `Authorization: Bearer <key>`
/// - `Authorization: Token <key>`
///
/// A request without an `Authorization` header passes through with no
/// context, so public routes work and protected operations can report
/// "authentication required" themselves. A header that is present but
/// malformed, or names an unknown key, is rejected here with 401.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use kanmind_shared::auth::middleware::{create_token_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn whoami(auth: Option<Extension<AuthContext>>) -> String {
///     match auth {
///         Some(Extension(auth)) => auth.user_id.to_string(),
///         None => "anonymous".to_string(),
///     }
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(middleware::from_fn(create_token_middleware(pool)))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::token::is_well_formed;
use crate::models::auth_token::AuthToken;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Header present but not `Bearer <key>` / `Token <key>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Key does not resolve to a user
    #[error("{0}")]
    InvalidToken(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AuthError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Token lookup failed");
                json!({ "error": "internal_error", "message": "An internal error occurred" })
            }
            other => json!({ "error": "unauthorized", "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Extracts the key from an `Authorization` header value.
pub fn parse_authorization(value: &str) -> Result<&str, AuthError> {
    let key = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer or Token scheme".to_string()))?
        .trim();

    if key.is_empty() {
        return Err(AuthError::InvalidFormat("Missing token".to_string()));
    }

    Ok(key)
}

/// Resolves a raw `Authorization` header value to its user.
pub async fn authenticate(pool: &PgPool, header_value: &str) -> Result<AuthContext, AuthError> {
    let key = parse_authorization(header_value)?;

    if !is_well_formed(key) {
        return Err(AuthError::InvalidToken("Invalid token".to_string()));
    }

    let token = AuthToken::find_by_key(pool, key)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AuthError::InvalidToken("Invalid token".to_string()))?;

    Ok(AuthContext::new(token.user_id))
}

/// Token authentication middleware
///
/// Adds an [`AuthContext`] extension when a valid key is presented.
pub async fn token_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = match req.headers().get(header::AUTHORIZATION) {
        None => return Ok(next.run(req).await),
        Some(value) => value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?
            .to_string(),
    };

    let auth_context = authenticate(&pool, &header_value).await?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a token middleware closure that captures the pool
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use kanmind_shared::auth::middleware::create_token_middleware;
/// use sqlx::PgPool;
///
/// fn setup(pool: PgPool) -> Router {
///     Router::new()
///         .route("/api/boards", get(|| async { "OK" }))
///         .layer(middleware::from_fn(create_token_middleware(pool)))
/// }
/// ```
pub fn create_token_middleware(
    pool: PgPool,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    move |req, next| {
        let pool = pool.clone();
        Box::pin(token_auth_middleware(pool, req, next))
    }
}
