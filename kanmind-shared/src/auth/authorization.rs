/// Board-level access control
///
/// Every board, task and comment is governed by exactly one board. Access to
/// any of them is granted to that board's owner and members, nobody else.
///
/// # Resolution
///
/// - a board governs itself
/// - a task is governed by its board
/// - a comment is governed by its task's board
///
/// # Decision
///
/// 1. No principal: [`AuthzError::Unauthenticated`] (401)
/// 2. Principal is neither owner nor member: [`AuthzError::Forbidden`] (403)
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::auth::authorization::{authorize, resolve_board, Resource};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let task = kanmind_shared::models::task::Task::find_by_id(&pool, task_id).await?.unwrap();
/// let access = resolve_board(&pool, Resource::Task(&task)).await?;
/// authorize(Some(user_id), &access)?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::board::Board;
use crate::models::comment::Comment;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated principal
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    /// Principal is not the owner or a member of the governing board
    #[error("You do not have permission to access this board")]
    Forbidden,

    /// The resource's governing board could not be determined
    #[error("Cannot resolve governing board for {0}")]
    UnsupportedResource(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A resource whose access is decided by its governing board
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Board(&'a Board),
    Task(&'a Task),
    Comment(&'a Comment),
}

/// Where to look for a resource's governing board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoverningBoard {
    /// The board ID is known directly
    Board(Uuid),

    /// Resolve through the given task
    ViaTask(Uuid),
}

impl Resource<'_> {
    pub fn governing_board(&self) -> GoverningBoard {
        match self {
            Resource::Board(board) => GoverningBoard::Board(board.id),
            Resource::Task(task) => GoverningBoard::Board(task.board_id),
            Resource::Comment(comment) => GoverningBoard::ViaTask(comment.task_id),
        }
    }

    fn describe(&self) -> String {
        match self {
            Resource::Board(board) => format!("board {}", board.id),
            Resource::Task(task) => format!("task {}", task.id),
            Resource::Comment(comment) => format!("comment {}", comment.id),
        }
    }
}

/// Owner and member set of one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardAccess {
    pub board_id: Uuid,
    pub owner_id: Uuid,
    pub member_ids: Vec<Uuid>,
}

impl BoardAccess {
    /// Owner or member
    pub fn allows(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.member_ids.contains(&user_id)
    }

    /// Loads the access set for a board row.
    pub async fn load(pool: &PgPool, board: &Board) -> Result<Self, sqlx::Error> {
        let member_ids = Board::member_ids(pool, board.id).await?;

        Ok(Self {
            board_id: board.id,
            owner_id: board.owner_id,
            member_ids,
        })
    }
}

/// Finds the governing board of `resource` and loads its access set.
pub async fn resolve_board(pool: &PgPool, resource: Resource<'_>) -> Result<BoardAccess, AuthzError> {
    let board_id = match resource.governing_board() {
        GoverningBoard::Board(id) => id,
        GoverningBoard::ViaTask(task_id) => Task::find_by_id(pool, task_id)
            .await?
            .map(|task| task.board_id)
            .ok_or_else(|| AuthzError::UnsupportedResource(resource.describe()))?,
    };

    let board = match resource {
        Resource::Board(board) => board.clone(),
        _ => Board::find_by_id(pool, board_id)
            .await?
            .ok_or_else(|| AuthzError::UnsupportedResource(resource.describe()))?,
    };

    Ok(BoardAccess::load(pool, &board).await?)
}

/// Decides whether `principal` may act on the board.
pub fn authorize(principal: Option<Uuid>, access: &BoardAccess) -> Result<Uuid, AuthzError> {
    let user_id = require_principal(principal)?;

    if !access.allows(user_id) {
        tracing::warn!(%user_id, board_id = %access.board_id, "Board access denied");
        return Err(AuthzError::Forbidden);
    }

    Ok(user_id)
}

/// Operations that need a caller but no board (listing, board creation).
pub fn require_principal(principal: Option<Uuid>) -> Result<Uuid, AuthzError> {
    principal.ok_or(AuthzError::Unauthenticated)
}
