/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and email lookup
/// - `boards`: Board CRUD
/// - `tasks`: Task CRUD and personal task lists
/// - `comments`: Comments on tasks

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kanmind_shared::auth::middleware::AuthContext;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// The authenticated user
///
/// Rejects with 401 when the token middleware attached no [`AuthContext`].
/// Handlers take it right after `State` so that nothing about the request
/// body is reported to an anonymous caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .map(|auth| AuthUser(auth.user_id))
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided".to_string())
            })
    }
}

/// Runs the request-shape checks declared with `#[validate(...)]`.
pub(crate) fn validated<T: Validate>(req: T) -> Result<T, ApiError> {
    req.validate()?;
    Ok(req)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
