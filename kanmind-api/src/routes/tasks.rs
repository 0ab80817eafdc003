/// Task endpoints
///
/// - `POST /api/tasks` - Create a task on a board
/// - `GET /api/tasks/:task_id` - Task detail
/// - `PATCH /api/tasks/:task_id` - Partial update
/// - `DELETE /api/tasks/:task_id` - Delete with its comments
/// - `GET /api/tasks/assigned-to-me` - Tasks the caller works on
/// - `GET /api/tasks/reviewing` - Tasks the caller reviews
/// - `GET /api/tasks/involved` - Either of the two

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{double_option, AuthUser},
};
use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use kanmind_shared::{
    models::task::{Task, TaskPriority, TaskStatus, UpdateTask},
    services::tasks::{self, NewTask, TaskPatch},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Board the task belongs to
    pub board: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub assignee_id: Option<Uuid>,

    pub reviewer_id: Option<Uuid>,

    pub due_date: Option<NaiveDate>,
}

/// Partial update; `null` clears assignee, reviewer or due date
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// Must match the current board if sent
    pub board: Option<Uuid>,

    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            board_id: req.board,
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        }
    }
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            board_id: req.board,
            changes: UpdateTask {
                title: req.title,
                description: req.description,
                status: req.status,
                priority: req.priority,
                assignee_id: req.assignee_id,
                reviewer_id: req.reviewer_id,
                due_date: req.due_date,
            },
        }
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;

    let task = tasks::create(&state.db, Some(user_id), req.into()).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    task_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(task_id) = task_id?;

    let task = tasks::detail(&state.db, Some(user_id), task_id).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    task_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(task_id) = task_id?;
    let Json(req) = payload?;

    let task = tasks::update(&state.db, Some(user_id), task_id, req.into()).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    task_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(task_id) = task_id?;

    tasks::delete(&state.db, Some(user_id), task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assigned_to_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::assigned_to(&state.db, Some(user_id)).await?))
}

pub async fn reviewing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::reviewing(&state.db, Some(user_id)).await?))
}

pub async fn involved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::involving(&state.db, Some(user_id)).await?))
}
