/// Task lifecycle and personal task lists
///
/// Assignee and reviewer must belong to the task's board (owner or member)
/// whenever they are set. The check runs on create and on every update that
/// touches either field; later membership changes do not revisit it.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{valid_title, ServiceError, DESCRIPTION_MAX_CHARS};
use crate::auth::authorization::{authorize, require_principal, resolve_board, BoardAccess, Resource};
use crate::models::board::Board;
use crate::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crate::validation::{check_max_chars, FieldError};

/// Fields accepted when creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

/// Partial task update as received from a client
///
/// `board_id` may be echoed back but must match the task's current board.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub board_id: Option<Uuid>,
    pub changes: UpdateTask,
}

/// Rejects a user who is neither owner nor member of the board.
pub fn check_assignable(access: &BoardAccess, field: &str, user_id: Option<Uuid>) -> Result<(), FieldError> {
    match user_id {
        Some(id) if !access.allows(id) => Err(FieldError::new(
            field,
            "User must be the owner or a member of the board",
        )),
        _ => Ok(()),
    }
}

async fn find_task(pool: &PgPool, task_id: Uuid) -> Result<Task, ServiceError> {
    Task::find_by_id(pool, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))
}

pub async fn create(pool: &PgPool, principal: Option<Uuid>, new: NewTask) -> Result<Task, ServiceError> {
    require_principal(principal)?;
    let board = Board::find_by_id(pool, new.board_id)
        .await?
        .ok_or(ServiceError::NotFound("Board"))?;
    let access = resolve_board(pool, Resource::Board(&board)).await?;
    let user_id = authorize(principal, &access)?;

    let title = valid_title(&new.title)?;
    if let Some(description) = new.description.as_deref() {
        check_max_chars("description", description, DESCRIPTION_MAX_CHARS)?;
    }
    check_assignable(&access, "assignee_id", new.assignee_id)?;
    check_assignable(&access, "reviewer_id", new.reviewer_id)?;

    let task = Task::create(
        pool,
        CreateTask {
            board_id: board.id,
            title,
            description: new.description.unwrap_or_default(),
            status: new.status.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            assignee_id: new.assignee_id,
            reviewer_id: new.reviewer_id,
            due_date: new.due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, board_id = %board.id, %user_id, "Task created");

    Ok(task)
}

pub async fn detail(pool: &PgPool, principal: Option<Uuid>, task_id: Uuid) -> Result<Task, ServiceError> {
    require_principal(principal)?;
    let task = find_task(pool, task_id).await?;
    let access = resolve_board(pool, Resource::Task(&task)).await?;
    authorize(principal, &access)?;

    Ok(task)
}

/// Applies a partial update after re-checking assignee and reviewer.
pub async fn update(
    pool: &PgPool,
    principal: Option<Uuid>,
    task_id: Uuid,
    patch: TaskPatch,
) -> Result<Task, ServiceError> {
    require_principal(principal)?;
    let task = find_task(pool, task_id).await?;
    let access = resolve_board(pool, Resource::Task(&task)).await?;
    let user_id = authorize(principal, &access)?;

    if patch.board_id.is_some_and(|board_id| board_id != task.board_id) {
        return Err(FieldError::new("board", "A task cannot be moved to another board").into());
    }

    let mut changes = patch.changes;
    if let Some(title) = changes.title.as_deref() {
        changes.title = Some(valid_title(title)?);
    }
    if let Some(description) = changes.description.as_deref() {
        check_max_chars("description", description, DESCRIPTION_MAX_CHARS)?;
    }
    if let Some(assignee_id) = changes.assignee_id {
        check_assignable(&access, "assignee_id", assignee_id)?;
    }
    if let Some(reviewer_id) = changes.reviewer_id {
        check_assignable(&access, "reviewer_id", reviewer_id)?;
    }

    if changes.is_empty() {
        return Ok(task);
    }

    let task = Task::update(pool, task_id, changes)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    tracing::info!(%task_id, %user_id, "Task updated");

    Ok(task)
}

pub async fn delete(pool: &PgPool, principal: Option<Uuid>, task_id: Uuid) -> Result<(), ServiceError> {
    require_principal(principal)?;
    let task = find_task(pool, task_id).await?;
    let access = resolve_board(pool, Resource::Task(&task)).await?;
    let user_id = authorize(principal, &access)?;

    if !Task::delete(pool, task_id).await? {
        return Err(ServiceError::NotFound("Task"));
    }

    tracing::info!(%task_id, board_id = %task.board_id, %user_id, "Task deleted");

    Ok(())
}

pub async fn assigned_to(pool: &PgPool, principal: Option<Uuid>) -> Result<Vec<Task>, ServiceError> {
    let user_id = require_principal(principal)?;
    Ok(Task::list_assigned_to(pool, user_id).await?)
}

pub async fn reviewing(pool: &PgPool, principal: Option<Uuid>) -> Result<Vec<Task>, ServiceError> {
    let user_id = require_principal(principal)?;
    Ok(Task::list_reviewing(pool, user_id).await?)
}

/// Assignee or reviewer, each task once
pub async fn involving(pool: &PgPool, principal: Option<Uuid>) -> Result<Vec<Task>, ServiceError> {
    let user_id = require_principal(principal)?;
    Ok(Task::list_involving(pool, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_access(owner: Uuid, members: Vec<Uuid>) -> BoardAccess {
        BoardAccess {
            board_id: Uuid::new_v4(),
            owner_id: owner,
            member_ids: members,
        }
    }

    #[test]
    fn test_assignable_owner_and_member() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let access = board_access(owner, vec![member]);

        assert!(check_assignable(&access, "assignee_id", Some(owner)).is_ok());
        assert!(check_assignable(&access, "reviewer_id", Some(member)).is_ok());
        assert!(check_assignable(&access, "assignee_id", None).is_ok());
    }

    #[test]
    fn test_non_member_is_a_field_error() {
        let access = board_access(Uuid::new_v4(), vec![]);

        let err = check_assignable(&access, "reviewer_id", Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.field, "reviewer_id");
        assert!(err.message.contains("member"));
    }

    #[test]
    fn test_default_patch_is_empty() {
        let patch = TaskPatch::default();
        assert!(patch.board_id.is_none());
        assert!(patch.changes.is_empty());
    }
}
