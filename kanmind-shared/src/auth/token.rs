/// Opaque bearer token keys
///
/// Keys look like `kmt_` followed by 40 base62 characters. They carry no
/// claims; the server resolves them to a user through the `auth_tokens` table.
///
/// ```
/// use kanmind_shared::auth::token::{generate_token, is_well_formed, TOKEN_LENGTH};
///
/// let key = generate_token();
/// assert_eq!(key.len(), TOKEN_LENGTH);
/// assert!(is_well_formed(&key));
/// ```

use rand::{distributions::Alphanumeric, Rng};

const TOKEN_PREFIX: &str = "kmt_";

const TOKEN_RANDOM_LENGTH: usize = 40;

/// Total key length (prefix + random part)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a fresh random key (about 238 bits of entropy).
pub fn generate_token() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    format!("{}{}", TOKEN_PREFIX, random)
}

/// Cheap shape check done before touching the database.
pub fn is_well_formed(key: &str) -> bool {
    key.len() == TOKEN_LENGTH
        && key
            .strip_prefix(TOKEN_PREFIX)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_alphanumeric()))
}
