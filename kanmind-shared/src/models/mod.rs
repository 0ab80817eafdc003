/// Database models for KanMind
///
/// Each entity is reached only through the associated functions on its type;
/// there are no ambient query objects.
///
/// - `user`: accounts and public user summaries
/// - `auth_token`: one opaque bearer token per user
/// - `board`: boards, membership and dashboard counters
/// - `task`: tasks with status, priority, assignee and reviewer
/// - `comment`: comments on tasks
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::models::board::{Board, CreateBoard};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let board = Board::create(&pool, CreateBoard {
///     title: "Release 1.0".to_string(),
///     owner_id,
///     member_ids: vec![],
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod auth_token;
pub mod board;
pub mod comment;
pub mod task;
pub mod user;
