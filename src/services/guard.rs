//! Membership guard: the access decision for every board- and task-scoped
//! operation.
//!
//! Pure read logic: the guard performs only the store lookups it needs and
//! returns the loaded entity so callers avoid a second fetch. Existence is
//! always decided before membership, so a missing resource reports not-found
//! rather than forbidden.

use crate::error::AppError;
use crate::models::{Board, Task};
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const BOARD_COLUMNS: &str =
    "id, name, description, owner, members, is_public, next_position, created_at, updated_at";

pub(crate) const TASK_COLUMNS: &str = "id, title, description, task_type, priority, status, \
     assignee, reporter, board_id, column_id, labels, story_points, due_date, comments, \
     revision, created_at, updated_at";

pub struct MembershipGuard {
    pool: PgPool,
}

impl MembershipGuard {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the board and checks that `user_id` is one of its members.
    ///
    /// Fails with `BoardNotFound` when the board does not exist and with
    /// `Forbidden` when the user is not a member. Returns the board for reuse.
    pub async fn require_board_member(
        &self,
        board_id: Uuid,
        user_id: i32,
    ) -> Result<Board, AppError> {
        let board: Option<Board> =
            sqlx::query_as(&format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS))
                .bind(board_id)
                .fetch_optional(&self.pool)
                .await?;

        let board = board.ok_or(AppError::BoardNotFound)?;

        if !board.is_member(user_id) {
            return Err(AppError::Forbidden(
                "You are not a member of this board".into(),
            ));
        }

        Ok(board)
    }

    /// Loads the task and checks membership of the board it belongs to.
    ///
    /// Fails with `TaskNotFound` when the task does not exist. A dangling task
    /// whose board was removed is treated as inaccessible, not as a distinct
    /// error, so a missing board also reports `TaskNotFound`. Returns the task
    /// for reuse.
    pub async fn require_task_access(&self, task_id: Uuid, user_id: i32) -> Result<Task, AppError> {
        let task: Option<Task> =
            sqlx::query_as(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await?;

        let task = task.ok_or(AppError::TaskNotFound)?;

        match self.require_board_member(task.board_id, user_id).await {
            Ok(_) => Ok(task),
            Err(AppError::BoardNotFound) => Err(AppError::TaskNotFound),
            Err(other) => Err(other),
        }
    }
}
