/// Field-level validation rules
///
/// Every rule returns the first problem it finds as a [`FieldError`] naming the
/// offending request field. Services stop at the first failing rule and never
/// write anything after a failure.
///
/// # Example
///
/// ```
/// use kanmind_shared::validation::{validate_email_format, validate_password_strength};
///
/// assert!(validate_email_format("ada@example.com").is_ok());
/// assert!(validate_email_format("ada@example").is_err());
///
/// let err = validate_password_strength("NoDigits!!").unwrap_err();
/// assert_eq!(err.field, "password");
/// ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::sync::OnceLock;

use crate::models::user::User;

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Symbols that satisfy the "special character" rule
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// A validation failure tied to one request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Request field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A registration name split into first and last name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub first_name: String,
    pub last_name: String,
}

/// Requires at least two whitespace-separated parts.
///
/// The first part becomes the first name; everything after it, re-joined
/// with single spaces, becomes the last name.
pub fn validate_fullname(fullname: &str) -> Result<FullName, FieldError> {
    let mut parts = fullname.split_whitespace();

    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => {
            let last = std::iter::once(second).chain(parts).collect::<Vec<_>>().join(" ");
            Ok(FullName {
                first_name: first.to_string(),
                last_name: last,
            })
        }
        _ => Err(FieldError::new(
            "fullname",
            "Please provide both first and last name",
        )),
    }
}

/// Checks the address against the accepted email pattern.
pub fn validate_email_format(email: &str) -> Result<(), FieldError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(FieldError::new("email", "Invalid email address"))
    }
}

/// Fails if an account already uses the address (case-insensitive).
pub async fn validate_email_unique(pool: &PgPool, email: &str) -> Result<Result<(), FieldError>, sqlx::Error> {
    if User::email_exists(pool, email).await? {
        return Ok(Err(FieldError::new("email", "Email address is already in use")));
    }

    Ok(Ok(()))
}

/// Exact comparison; reported on `password`, separately from strength.
pub fn validate_passwords_match(password: &str, repeated_password: &str) -> Result<(), FieldError> {
    if password != repeated_password {
        return Err(FieldError::new("password", "Passwords do not match"));
    }

    Ok(())
}

/// Composite strength policy, checked in a fixed order:
/// length, uppercase, lowercase, digit, symbol.
pub fn validate_password_strength(password: &str) -> Result<(), FieldError> {
    let fail = |message: &str| Err(FieldError::new("password", message));

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return fail("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail("Password must contain at least one digit");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return fail("Password must contain at least one special character");
    }

    Ok(())
}

/// Trims `value` and rejects it if nothing is left.
pub fn require_non_blank(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "This field may not be blank"));
    }

    Ok(trimmed.to_string())
}

/// Rejects `value` if it is longer than `max` characters.
pub fn check_max_chars(field: &str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("Ensure this field has no more than {} characters", max),
        ));
    }

    Ok(())
}
