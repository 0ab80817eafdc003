/// Registration, login and email lookup
///
/// Both registration and login end in a [`Session`] carrying the user's
/// single bearer token. The token is created on first use and returned
/// unchanged afterwards.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::authorization::require_principal;
use crate::auth::password::{hash_password, verify_password};
use crate::models::auth_token::AuthToken;
use crate::models::user::{CreateUser, User, UserSummary};
use crate::validation::{
    validate_email_format, validate_email_unique, validate_fullname, validate_password_strength,
    validate_passwords_match,
};

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub repeated_password: String,
}

/// Issued credential plus the identity it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub fullname: String,
    pub email: String,
    pub user_id: Uuid,
}

impl Session {
    fn new(user: &User, token: AuthToken) -> Self {
        Self {
            token: token.key,
            fullname: user.fullname(),
            email: user.email.clone(),
            user_id: user.id,
        }
    }
}

/// Creates an account and issues its token.
///
/// Checks run in a fixed order and the first failure is returned:
/// name shape, email format, email uniqueness, password confirmation,
/// password strength.
pub async fn register(pool: &PgPool, form: Registration) -> Result<Session, ServiceError> {
    let name = validate_fullname(&form.fullname)?;
    let email = form.email.trim();
    validate_email_format(email)?;
    validate_email_unique(pool, email).await??;
    validate_passwords_match(&form.password, &form.repeated_password)?;
    validate_password_strength(&form.password)?;

    let password_hash = hash_password(&form.password)?;

    let user = User::create(
        pool,
        CreateUser {
            email: email.to_string(),
            password_hash,
            first_name: name.first_name,
            last_name: name.last_name,
        },
    )
    .await
    .map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::Conflict("Email address is already in use".to_string())
        } else {
            ServiceError::Database(e)
        }
    })?;

    let (token, _) = AuthToken::get_or_create(pool, user.id).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Session::new(&user, token))
}

/// Verifies credentials and returns the user's token.
///
/// An unknown email is `NotFound`; a wrong password is `InvalidCredentials`.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<Session, ServiceError> {
    let user = User::find_by_email(pool, email.trim())
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    User::update_last_login(pool, user.id).await?;
    let (token, created) = AuthToken::get_or_create(pool, user.id).await?;

    tracing::info!(user_id = %user.id, new_token = created, "User logged in");

    Ok(Session::new(&user, token))
}

/// Looks up another user by email, for adding members and assignees.
pub async fn check_email(
    pool: &PgPool,
    principal: Option<Uuid>,
    email: Option<&str>,
) -> Result<UserSummary, ServiceError> {
    require_principal(principal)?;

    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("Email parameter is required".to_string()))?;

    validate_email_format(email)?;

    let user = User::find_by_email(pool, email)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    Ok(user.summary())
}
