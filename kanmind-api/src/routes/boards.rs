/// Board endpoints
///
/// - `GET /api/boards` - Boards the caller owns or belongs to, with counters
/// - `POST /api/boards` - Create a board owned by the caller
/// - `GET /api/boards/:board_id` - Board with members and tasks
/// - `PATCH /api/boards/:board_id` - Rename and/or replace members
/// - `DELETE /api/boards/:board_id` - Delete with all tasks and comments

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
use kanmind_shared::{
    models::board::{Board, BoardSummary},
    services::boards::{self, BoardDetail},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub title: String,

    /// Member user IDs; duplicates are ignored
    #[serde(default)]
    pub members: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardRequest {
    pub title: Option<String>,

    /// Replacement member set
    pub members: Option<Vec<Uuid>>,
}

pub async fn list_boards(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let boards = boards::list_for(&state.db, Some(user_id)).await?;
    Ok(Json(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let Json(req) = payload?;

    let board = boards::create(&state.db, Some(user_id), &req.title, &req.members).await?;

    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    board_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BoardDetail>> {
    let Path(board_id) = board_id?;

    let board = boards::detail(&state.db, Some(user_id), board_id).await?;
    Ok(Json(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    board_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateBoardRequest>, JsonRejection>,
) -> ApiResult<Json<BoardDetail>> {
    let Path(board_id) = board_id?;
    let Json(req) = payload?;

    let board = boards::update(
        &state.db,
        Some(user_id),
        board_id,
        req.title.as_deref(),
        req.members.as_deref(),
    )
    .await?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    board_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(board_id) = board_id?;

    boards::delete(&state.db, Some(user_id), board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
