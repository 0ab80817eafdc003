/// Board lifecycle and membership
///
/// The creating user becomes owner. Owner and members share full access,
/// including deletion.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{valid_title, ServiceError};
use crate::auth::authorization::{authorize, require_principal, resolve_board, Resource};
use crate::models::board::{Board, BoardSummary, CreateBoard, UpdateBoard};
use crate::models::task::Task;
use crate::models::user::{User, UserSummary};
use crate::validation::FieldError;

/// Board with its members and tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<Task>,
}

/// Removes duplicates (keeping first occurrence) and rejects unknown users.
pub async fn validate_members(pool: &PgPool, member_ids: &[Uuid]) -> Result<Vec<Uuid>, ServiceError> {
    let mut unique = Vec::with_capacity(member_ids.len());
    for id in member_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    let existing = User::existing_ids(pool, &unique).await?;
    let unknown: Vec<String> = unique
        .iter()
        .filter(|id| !existing.contains(id))
        .map(ToString::to_string)
        .collect();

    if !unknown.is_empty() {
        return Err(FieldError::new("members", format!("Unknown user id(s): {}", unknown.join(", "))).into());
    }

    Ok(unique)
}

async fn find_board(pool: &PgPool, board_id: Uuid) -> Result<Board, ServiceError> {
    Board::find_by_id(pool, board_id)
        .await?
        .ok_or(ServiceError::NotFound("Board"))
}

async fn load_detail(pool: &PgPool, board: Board) -> Result<BoardDetail, ServiceError> {
    let member_ids = Board::member_ids(pool, board.id).await?;
    let members = User::summaries(pool, &member_ids).await?;
    let tasks = Task::list_by_board(pool, board.id).await?;

    Ok(BoardDetail {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    })
}

/// Creates a board owned by the caller.
pub async fn create(
    pool: &PgPool,
    principal: Option<Uuid>,
    title: &str,
    member_ids: &[Uuid],
) -> Result<Board, ServiceError> {
    let owner_id = require_principal(principal)?;
    let title = valid_title(title)?;
    let member_ids = validate_members(pool, member_ids).await?;

    let board = Board::create(
        pool,
        CreateBoard {
            title,
            owner_id,
            member_ids,
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, %owner_id, "Board created");

    Ok(board)
}

/// Boards the caller owns or belongs to, with dashboard counters.
pub async fn list_for(pool: &PgPool, principal: Option<Uuid>) -> Result<Vec<BoardSummary>, ServiceError> {
    let user_id = require_principal(principal)?;
    Ok(Board::list_for_user(pool, user_id).await?)
}

pub async fn detail(pool: &PgPool, principal: Option<Uuid>, board_id: Uuid) -> Result<BoardDetail, ServiceError> {
    require_principal(principal)?;
    let board = find_board(pool, board_id).await?;
    let access = resolve_board(pool, Resource::Board(&board)).await?;
    authorize(principal, &access)?;

    load_detail(pool, board).await
}

/// Renames the board and/or replaces its member set.
pub async fn update(
    pool: &PgPool,
    principal: Option<Uuid>,
    board_id: Uuid,
    title: Option<&str>,
    member_ids: Option<&[Uuid]>,
) -> Result<BoardDetail, ServiceError> {
    require_principal(principal)?;
    let board = find_board(pool, board_id).await?;
    let access = resolve_board(pool, Resource::Board(&board)).await?;
    let user_id = authorize(principal, &access)?;

    let title = title.map(valid_title).transpose()?;
    let member_ids = match member_ids {
        Some(ids) => Some(validate_members(pool, ids).await?),
        None => None,
    };

    let board = Board::update(pool, board_id, UpdateBoard { title, member_ids })
        .await?
        .ok_or(ServiceError::NotFound("Board"))?;

    tracing::info!(%board_id, %user_id, "Board updated");

    load_detail(pool, board).await
}

/// Deletes the board along with its tasks and comments.
pub async fn delete(pool: &PgPool, principal: Option<Uuid>, board_id: Uuid) -> Result<(), ServiceError> {
    require_principal(principal)?;
    let board = find_board(pool, board_id).await?;
    let access = resolve_board(pool, Resource::Board(&board)).await?;
    let user_id = authorize(principal, &access)?;

    if !Board::delete(pool, board_id).await? {
        return Err(ServiceError::NotFound("Board"));
    }

    tracing::info!(%board_id, %user_id, "Board deleted");

    Ok(())
}
