use crate::error::AppError;
use crate::models::user::AuthorProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the kind of a task.
/// Corresponds to the `task_type` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// A regular unit of work.
    Task,
    /// A defect.
    Bug,
    /// A user story.
    Story,
    /// A large body of work grouping stories.
    Epic,
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Task
    }
}

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Lowest,
    Low,
    Medium,
    High,
    Highest,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Status is a plain enumerated field: any status may be assigned from any
/// other, there is no validated transition graph.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// An author-attributed note embedded in a task's comment list.
///
/// Comments live exclusively inside their parent task document (a JSONB
/// column) and are never referenced from anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Unique identifier for the comment (UUID v4).
    pub id: Uuid,
    /// The comment text (1-1000 characters).
    pub content: String,
    /// Identifier of the authoring user. Only the author may delete it.
    pub author: i32,
    /// Timestamp of when the comment was written.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: i32, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            author,
            created_at: Utc::now(),
        }
    }
}

/// A comment with its author resolved to a minimal profile, as returned
/// after adding a comment. The profile is `None` when the authoring account
/// has since been deleted.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author: Option<AuthorProfile>,
    pub created_at: DateTime<Utc>,
}

/// Input structure for adding a comment to a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    /// The comment text. Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Represents a task entity as stored in the database and returned by the API.
///
/// The struct also derives `Validate` so that the result of a partial update
/// merge can be re-checked against the same constraints as creation.
#[derive(Debug, Serialize, Deserialize, FromRow, Validate)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The task title (1-200 characters).
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// An optional description (up to 2000 characters).
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// The kind of task.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// The priority of the task.
    pub priority: TaskPriority,
    /// The current status of the task.
    pub status: TaskStatus,
    /// Identifier of the user the task is assigned to (optional).
    pub assignee: Option<i32>,
    /// Identifier of the user who reported the task. Immutable after creation.
    pub reporter: i32,
    /// Identifier of the owning board. Access checks resolve membership
    /// through this reference, not through the column.
    pub board_id: Uuid,
    /// Identifier of the owning column. Must belong to `board_id`.
    pub column_id: Uuid,
    /// Free-form labels, each up to 20 characters.
    #[validate(custom = "validate_labels")]
    pub labels: Vec<String>,
    /// Optional story-point estimate (0-100).
    #[validate(range(min = 0, max = 100))]
    pub story_points: Option<i32>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Embedded comment list, most-recent-first.
    pub comments: Json<Vec<Comment>>,
    /// Monotonic document revision used for optimistic concurrency on
    /// read-modify-write operations (comment list, partial updates).
    pub revision: i64,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

fn validate_labels(labels: &Vec<String>) -> Result<(), ValidationError> {
    if labels.iter().any(|label| label.len() > 20) {
        return Err(ValidationError::new("labels must be at most 20 characters"));
    }
    Ok(())
}

/// Input structure for creating a task. `title` and `column` are required;
/// everything else falls back to the documented defaults.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The task title. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description. Maximum length of 2000 characters if provided.
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// The kind of task. Defaults to `task`.
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,

    /// The priority. Defaults to `medium`.
    pub priority: Option<TaskPriority>,

    /// The status. Defaults to `todo`.
    pub status: Option<TaskStatus>,

    /// Optional assignee user id.
    pub assignee: Option<i32>,

    /// Identifier of the column the task is placed in. Required; must belong
    /// to the board the task is created on.
    pub column: Uuid,

    /// Labels, each up to 20 characters.
    #[validate(custom = "validate_labels")]
    pub labels: Option<Vec<String>>,

    /// Optional story-point estimate (0-100).
    #[validate(range(min = 0, max = 100))]
    pub story_points: Option<i32>,

    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update for a task. Every mutable field is optional; absent fields
/// are left untouched. Unknown fields are rejected rather than silently
/// merged, and `reporter` is deliberately not part of the payload.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    pub assignee: Option<i32>,

    /// Moving the task to another column; the column must belong to the
    /// task's board.
    pub column: Option<Uuid>,

    #[validate(custom = "validate_labels")]
    pub labels: Option<Vec<String>>,

    #[validate(range(min = 0, max = 100))]
    pub story_points: Option<i32>,

    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput`, the owning board and the
    /// reporting user. Applies defaults for type, priority and status and
    /// starts with an empty comment list at revision zero.
    pub fn new(input: TaskInput, board_id: Uuid, reporter: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            task_type: input.task_type.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            assignee: input.assignee,
            reporter,
            board_id,
            column_id: input.column,
            labels: input.labels.unwrap_or_default(),
            story_points: input.story_points,
            due_date: input.due_date,
            comments: Json(Vec::new()),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a partial update into the task. The caller re-validates the
    /// merged result and re-checks column/board consistency before persisting.
    pub fn apply_update(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(task_type) = update.task_type {
            self.task_type = task_type;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(assignee) = update.assignee {
            self.assignee = Some(assignee);
        }
        if let Some(column) = update.column {
            self.column_id = column;
        }
        if let Some(labels) = update.labels {
            self.labels = labels;
        }
        if let Some(story_points) = update.story_points {
            self.story_points = Some(story_points);
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
    }

    /// Inserts a comment at the head of the list (most-recent-first ordering).
    pub fn prepend_comment(&mut self, comment: Comment) {
        self.comments.0.insert(0, comment);
    }

    /// Removes the comment with the given id, provided the requester wrote it.
    ///
    /// Fails with `NotFound` when no such comment exists in the list and with
    /// `Forbidden` when the requester is not the author. The relative order of
    /// the remaining comments is preserved.
    pub fn remove_comment(&mut self, comment_id: Uuid, requester: i32) -> Result<Comment, AppError> {
        let index = self
            .comments
            .0
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

        if self.comments.0[index].author != requester {
            return Err(AppError::Forbidden(
                "You cannot delete another user's comment".into(),
            ));
        }

        Ok(self.comments.0.remove(index))
    }
}
