/// Registration, login and email lookup
///
/// # Endpoints
///
/// - `POST /api/registration` - Create an account and get a token
/// - `POST /api/login` - Get the token for an existing account
/// - `GET /api/email-check?email=` - Look up a user by email (authenticated)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{validated, AuthUser},
};
use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    http::StatusCode,
    Json,
};
use kanmind_shared::{
    models::user::UserSummary,
    services::identity::{self, Registration, Session},
};
use serde::Deserialize;
use validator::Validate;

/// Registration request
///
/// Only upper bounds are checked here; the content rules (name shape, email
/// pattern, password policy) are applied by the identity service in order.
/// Missing fields read as empty strings and fail those rules as field errors.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationRequest {
    #[validate(length(max = 150, message = "Name must be at most 150 characters"))]
    pub fullname: String,

    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub email: String,

    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,

    pub repeated_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Email lookup query
#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    pub email: Option<String>,
}

/// Register a new user
///
/// ```text
/// POST /api/registration
///
/// {
///   "fullname": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "Analytical#1843",
///   "repeated_password": "Analytical#1843"
/// }
/// ```
///
/// Responds `201` with `{ token, fullname, email, user_id }`.
pub async fn registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let Json(req) = payload?;
    let req = validated(req)?;

    let session = identity::register(
        &state.db,
        Registration {
            fullname: req.fullname,
            email: req.email,
            password: req.password,
            repeated_password: req.repeated_password,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in
///
/// Unknown email is `404`; a wrong password is `400 invalid_credentials`.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = payload?;
    let req = validated(req)?;

    let session = identity::login(&state.db, &req.email, &req.password).await?;

    Ok(Json(session))
}

/// Look up a user by email
pub async fn email_check(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<EmailCheckQuery>, QueryRejection>,
) -> ApiResult<Json<UserSummary>> {
    let Query(query) = query?;

    let user = identity::check_email(&state.db, Some(user_id), query.email.as_deref()).await?;

    Ok(Json(user))
}
