/// Comment endpoints
///
/// - `GET /api/tasks/:task_id/comments` - Comments, oldest first
/// - `POST /api/tasks/:task_id/comments` - Add a comment as the caller
/// - `DELETE /api/tasks/:task_id/comments/:comment_id` - Author only

use crate::{
    app::AppState,
    error::ApiResult,
    routes::AuthUser,
};
use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use kanmind_shared::{models::comment::Comment, services::comments};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    task_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<Comment>>> {
    let Path(task_id) = task_id?;

    let comments = comments::list(&state.db, Some(user_id), task_id).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    task_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let Path(task_id) = task_id?;
    let Json(req) = payload?;

    let comment = comments::create(&state.db, Some(user_id), task_id, &req.content).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path((task_id, comment_id)) = ids?;

    comments::delete(&state.db, Some(user_id), task_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
