/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: opaque bearer token keys
/// - [`middleware`]: resolves the `Authorization` header to a user
/// - [`authorization`]: board-level access decisions for boards, tasks and comments
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::auth::password::{hash_password, verify_password};
/// use kanmind_shared::auth::token::generate_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Kanban#2024")?;
/// assert!(verify_password("Kanban#2024", &hash)?);
///
/// let key = generate_token();
/// assert!(key.starts_with("kmt_"));
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod token;
