//! Comment lifecycle within a task: the embedded, most-recent-first comment
//! list and the author-only deletion rule.
//!
//! The list mutations themselves are pure methods on `Task`; this service
//! adds persistence with an optimistic-concurrency revision check so two
//! concurrent writers cannot silently drop each other's changes.

use crate::error::AppError;
use crate::models::{AuthorProfile, Comment, CommentInput, CommentView, Task};
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

pub struct CommentEngine {
    pool: PgPool,
}

impl CommentEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds a comment authored by `author` at the head of the task's list and
    /// returns the full list with authors resolved to minimal profiles.
    ///
    /// The caller supplies the task it already loaded through the membership
    /// guard; the write fails with `Conflict` if the task's revision moved in
    /// the meantime.
    pub async fn add_comment(
        &self,
        mut task: Task,
        author: i32,
        input: CommentInput,
    ) -> Result<Vec<CommentView>, AppError> {
        input.validate()?;

        task.prepend_comment(Comment::new(author, input.content));
        self.persist_comments(&task).await?;

        self.resolve_authors(&task.comments.0).await
    }

    /// Deletes a comment from the task's list, preserving the relative order
    /// of the remaining comments.
    ///
    /// Fails with `NotFound` when the comment is not in the list and with
    /// `Forbidden` when `requester` is not its author.
    pub async fn delete_comment(
        &self,
        mut task: Task,
        comment_id: Uuid,
        requester: i32,
    ) -> Result<(), AppError> {
        task.remove_comment(comment_id, requester)?;
        self.persist_comments(&task).await
    }

    /// Writes the task's comment list back, guarded by the revision the task
    /// was read at. Zero affected rows means a concurrent writer won.
    async fn persist_comments(&self, task: &Task) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE tasks SET comments = $1, revision = revision + 1, updated_at = $2
             WHERE id = $3 AND revision = $4",
        )
        .bind(&task.comments)
        .bind(Utc::now())
        .bind(task.id)
        .bind(task.revision)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Task was modified concurrently".into()));
        }

        Ok(())
    }

    /// Resolves comment author ids to (username, email) profiles for display.
    async fn resolve_authors(&self, comments: &[Comment]) -> Result<Vec<CommentView>, AppError> {
        let mut author_ids: Vec<i32> = comments.iter().map(|c| c.author).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let profiles: Vec<AuthorProfile> =
            sqlx::query_as("SELECT id, username, email FROM users WHERE id = ANY($1)")
                .bind(&author_ids)
                .fetch_all(&self.pool)
                .await?;

        let by_id: HashMap<i32, AuthorProfile> =
            profiles.into_iter().map(|p| (p.id, p)).collect();

        Ok(comments
            .iter()
            .map(|c| CommentView {
                id: c.id,
                content: c.content.clone(),
                author: by_id.get(&c.author).cloned(),
                created_at: c.created_at,
            })
            .collect())
    }
}
