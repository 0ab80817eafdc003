/// Resource services
///
/// Each service function takes the requesting principal (if any), runs lookup,
/// authorization and validation to completion, and only then writes.
///
/// - `identity`: registration, login, email lookup
/// - `boards`: board lifecycle and membership
/// - `tasks`: task lifecycle and personal task lists
/// - `comments`: comments on tasks
///
/// All of them report failures as [`ServiceError`].

pub mod boards;
pub mod comments;
pub mod identity;
pub mod tasks;

use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;
use crate::validation::{check_max_chars, require_non_blank, FieldError};

/// Longest accepted board or task title
pub const TITLE_MAX_CHARS: usize = 255;

/// Longest accepted task description
pub const DESCRIPTION_MAX_CHARS: usize = 10_000;

/// Longest accepted comment
pub const COMMENT_MAX_CHARS: usize = 5_000;

/// Trimmed, non-blank title within [`TITLE_MAX_CHARS`]
pub(crate) fn valid_title(title: &str) -> Result<String, FieldError> {
    let title = require_non_blank("title", title)?;
    check_max_chars("title", &title, TITLE_MAX_CHARS)?;
    Ok(title)
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// One or more request fields failed validation
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Request is structurally unusable (e.g. a required parameter is missing)
    #[error("{0}")]
    BadRequest(String),

    /// Target entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Wrong password at login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No authenticated principal
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness conflict that slipped past validation
    #[error("{0}")]
    Conflict(String),

    /// Configuration or invariant failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error
    #[error(transparent)]
    Password(#[from] PasswordError),
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// True for the unique-constraint violation Postgres reports as 23505
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        err.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
    }
}

impl From<FieldError> for ServiceError {
    fn from(e: FieldError) -> Self {
        Self::Validation(vec![e])
    }
}

impl From<AuthzError> for ServiceError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::Unauthenticated => Self::Unauthenticated,
            AuthzError::Forbidden => Self::Forbidden(e.to_string()),
            AuthzError::UnsupportedResource(_) => {
                tracing::error!(error = %e, "Resource resolution failed");
                Self::Internal(e.to_string())
            }
            AuthzError::DatabaseError(db) => Self::Database(db),
        }
    }
}
