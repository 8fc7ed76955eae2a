//! Hierarchy store: CRUD over boards, columns and tasks with the structural
//! invariants that keep the Board -> Column -> Task tree consistent.
//!
//! Callers are expected to have passed the membership guard before invoking
//! the mutating operations here; this layer enforces field constraints,
//! column ordering, and the column/board cross-check.

use crate::error::AppError;
use crate::models::{Board, BoardInput, Column, ColumnInput, Task, TaskInput, TaskUpdate};
use crate::services::guard::{BOARD_COLUMNS, TASK_COLUMNS};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct HierarchyStore {
    pool: PgPool,
}

impl HierarchyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a board owned by `owner`, who becomes its sole initial member.
    pub async fn create_board(&self, owner: i32, input: BoardInput) -> Result<Board, AppError> {
        input.validate()?;

        let board: Board = sqlx::query_as(&format!(
            "INSERT INTO boards (id, name, description, owner, members, is_public)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            BOARD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .bind(owner)
        .bind(vec![owner])
        .bind(input.is_public.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;

        Ok(board)
    }

    /// Lists every board the user is a member of.
    pub async fn list_boards_for_user(&self, user_id: i32) -> Result<Vec<Board>, AppError> {
        let boards = sqlx::query_as(&format!(
            "SELECT {} FROM boards WHERE $1 = ANY(members)",
            BOARD_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(boards)
    }

    /// Appends a column to the board.
    ///
    /// The position comes from an atomic increment-and-fetch on the board's
    /// counter, inside the same transaction as the insert, so concurrent
    /// creates on one board cannot produce duplicate positions. Sequential
    /// creates yield the dense sequence 0, 1, ..., N-1.
    pub async fn create_column(
        &self,
        board_id: Uuid,
        input: ColumnInput,
    ) -> Result<Column, AppError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let position: Option<i32> = sqlx::query_scalar(
            "UPDATE boards SET next_position = next_position + 1, updated_at = $1
             WHERE id = $2
             RETURNING next_position - 1",
        )
        .bind(Utc::now())
        .bind(board_id)
        .fetch_optional(&mut *tx)
        .await?;

        let position = position.ok_or(AppError::BoardNotFound)?;

        let column: Column = sqlx::query_as(
            "INSERT INTO columns (id, name, position, board_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, position, board_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(position)
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(column)
    }

    /// Lists the board's columns in ascending position order.
    pub async fn list_columns(&self, board_id: Uuid) -> Result<Vec<Column>, AppError> {
        let columns = sqlx::query_as(
            "SELECT id, name, position, board_id, created_at
             FROM columns WHERE board_id = $1 ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns)
    }

    /// Creates a task on the board with `reporter` as the acting identity.
    ///
    /// The referenced column must exist and belong to the same board;
    /// a mismatched pair is a validation failure, not a silent accept.
    pub async fn create_task(
        &self,
        board_id: Uuid,
        reporter: i32,
        input: TaskInput,
    ) -> Result<Task, AppError> {
        input.validate()?;
        self.check_column_on_board(input.column, board_id).await?;

        let task = Task::new(input, board_id, reporter);

        let created: Task = sqlx::query_as(&format!(
            "INSERT INTO tasks (id, title, description, task_type, priority, status, assignee,
                                reporter, board_id, column_id, labels, story_points, due_date,
                                comments)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.task_type)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.assignee)
        .bind(task.reporter)
        .bind(task.board_id)
        .bind(task.column_id)
        .bind(&task.labels)
        .bind(task.story_points)
        .bind(task.due_date)
        .bind(&task.comments)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Lists all tasks belonging to the board.
    pub async fn list_tasks(&self, board_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as(&format!(
            "SELECT {} FROM tasks WHERE board_id = $1",
            TASK_COLUMNS
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task and re-validates the merged result
    /// against the same constraints as creation.
    ///
    /// The caller supplies the task it already loaded through the membership
    /// guard. When the update moves the task to another column, the new
    /// column must belong to the task's board. The write is revision-guarded:
    /// if the task changed between the read and the write, the update fails
    /// with `Conflict` instead of silently overwriting.
    pub async fn update_task(&self, mut task: Task, update: TaskUpdate) -> Result<Task, AppError> {
        update.validate()?;

        if let Some(column) = update.column {
            self.check_column_on_board(column, task.board_id).await?;
        }

        task.apply_update(update);
        task.validate()?;

        let updated: Option<Task> = sqlx::query_as(&format!(
            "UPDATE tasks
             SET title = $1, description = $2, task_type = $3, priority = $4, status = $5,
                 assignee = $6, column_id = $7, labels = $8, story_points = $9, due_date = $10,
                 revision = revision + 1, updated_at = $11
             WHERE id = $12 AND revision = $13
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.task_type)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.assignee)
        .bind(task.column_id)
        .bind(&task.labels)
        .bind(task.story_points)
        .bind(task.due_date)
        .bind(Utc::now())
        .bind(task.id)
        .bind(task.revision)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::Conflict("Task was modified concurrently".into()))
    }

    /// Removes the task. Embedded comments go with the document; nothing on
    /// the board or column is recounted.
    pub async fn delete_task(&self, task_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::TaskNotFound);
        }

        Ok(())
    }

    /// Verifies the referenced column exists and belongs to the given board.
    async fn check_column_on_board(&self, column_id: Uuid, board_id: Uuid) -> Result<(), AppError> {
        let column_board: Option<Uuid> =
            sqlx::query_scalar("SELECT board_id FROM columns WHERE id = $1")
                .bind(column_id)
                .fetch_optional(&self.pool)
                .await?;

        match column_board {
            Some(owner) if owner == board_id => Ok(()),
            Some(_) => Err(AppError::Validation(
                "column: the referenced column belongs to a different board".into(),
            )),
            None => Err(AppError::Validation(
                "column: the referenced column does not exist".into(),
            )),
        }
    }
}
