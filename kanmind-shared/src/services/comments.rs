/// Comments on tasks
///
/// Reading and writing need access to the task's board. Deleting additionally
/// needs authorship; the board owner gets no override.

use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, COMMENT_MAX_CHARS};
use crate::auth::authorization::{authorize, require_principal, resolve_board, Resource};
use crate::models::comment::{Comment, CreateComment};
use crate::models::task::Task;
use crate::validation::{check_max_chars, require_non_blank};

async fn find_task(pool: &PgPool, task_id: Uuid) -> Result<Task, ServiceError> {
    Task::find_by_id(pool, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))
}

pub async fn create(
    pool: &PgPool,
    principal: Option<Uuid>,
    task_id: Uuid,
    content: &str,
) -> Result<Comment, ServiceError> {
    require_principal(principal)?;
    let task = find_task(pool, task_id).await?;
    let access = resolve_board(pool, Resource::Task(&task)).await?;
    let author_id = authorize(principal, &access)?;

    let content = require_non_blank("content", content)?;
    check_max_chars("content", &content, COMMENT_MAX_CHARS)?;

    let comment = Comment::create(
        pool,
        CreateComment {
            task_id,
            author_id,
            content,
        },
    )
    .await?;

    tracing::info!(comment_id = %comment.id, %task_id, %author_id, "Comment created");

    Ok(comment)
}

/// Comments on the task, oldest first.
pub async fn list(pool: &PgPool, principal: Option<Uuid>, task_id: Uuid) -> Result<Vec<Comment>, ServiceError> {
    require_principal(principal)?;
    let task = find_task(pool, task_id).await?;
    let access = resolve_board(pool, Resource::Task(&task)).await?;
    authorize(principal, &access)?;

    Ok(Comment::list_by_task(pool, task_id).await?)
}

/// Deletes a comment written by the caller.
///
/// A comment that exists but belongs to a different task is reported as not
/// found.
pub async fn delete(
    pool: &PgPool,
    principal: Option<Uuid>,
    task_id: Uuid,
    comment_id: Uuid,
) -> Result<(), ServiceError> {
    require_principal(principal)?;
    find_task(pool, task_id).await?;

    let comment = Comment::find_by_id(pool, comment_id)
        .await?
        .filter(|c| c.task_id == task_id)
        .ok_or(ServiceError::NotFound("Comment"))?;

    let access = resolve_board(pool, Resource::Comment(&comment)).await?;
    let user_id = authorize(principal, &access)?;

    if comment.author_id != user_id {
        tracing::warn!(%comment_id, %user_id, "Comment delete denied: not the author");
        return Err(ServiceError::forbidden("Only the author can delete this comment"));
    }

    if !Comment::delete(pool, comment_id).await? {
        return Err(ServiceError::NotFound("Comment"));
    }

    tracing::info!(%comment_id, %task_id, %user_id, "Comment deleted");

    Ok(())
}
