/// Board model and database operations
///
/// A board has exactly one owner and any number of members. The owner is not
/// stored in `board_members`; owner access is implicit.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// Deleting a board cascades to its tasks, and from there to their comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Board row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Board ID
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// The single owning user
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    /// Display title
    pub title: String,

    /// Creating user, who becomes owner
    pub owner_id: Uuid,

    /// Initial members (already deduplicated and checked to exist)
    pub member_ids: Vec<Uuid>,
}

/// Partial board update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    /// New title
    pub title: Option<String>,

    /// Replacement member set
    pub member_ids: Option<Vec<Uuid>>,
}

/// Board row annotated with the counters shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Number of members (owner not included)
    pub member_count: i64,

    /// Number of tasks on the board
    pub ticket_count: i64,

    /// Tasks with status `to-do`
    pub tasks_to_do_count: i64,

    /// Tasks with priority `high`
    pub tasks_high_prio_count: i64,
}

impl Board {
    /// Inserts the board and its members in one transaction.
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_members(&mut tx, board.id, &data.member_ids).await?;
        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            "SELECT id, title, owner_id, created_at, updated_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Member user IDs in the order they were added
    pub async fn member_ids(pool: &PgPool, board_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM board_members WHERE board_id = $1 ORDER BY created_at, user_id",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Boards the user owns or is a member of, with dashboard counters.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let boards = sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.id, b.title, b.owner_id,
                   (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
                   (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count
            FROM boards b
            WHERE b.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM board_members m
                   WHERE m.board_id = b.id AND m.user_id = $1
               )
            ORDER BY b.created_at ASC, b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Applies a partial update; the member set is replaced wholesale.
    ///
    /// Returns `None` if the board does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = COALESCE($2, title), updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(board) = board else {
            return Ok(None);
        };

        if let Some(member_ids) = data.member_ids {
            sqlx::query("DELETE FROM board_members WHERE board_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_members(&mut tx, id, &member_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(board))
    }

    /// Deletes a board; tasks and comments go with it.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_members(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    member_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if member_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO board_members (board_id, user_id)
        SELECT $1, UNNEST($2::UUID[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(board_id)
    .bind(member_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
