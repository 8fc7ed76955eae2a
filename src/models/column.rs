use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// An ordered, named subdivision of a board's task flow (e.g. "To Do").
///
/// Positions within a board are dense and zero-based in creation order;
/// columns are append-only in this design (no reordering operation exists).
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Column {
    /// Unique identifier for the column (UUID v4).
    pub id: Uuid,
    /// The column name (1-50 characters).
    pub name: String,
    /// Zero-based position within the owning board.
    pub position: i32,
    /// Identifier of the owning board.
    pub board_id: Uuid,
    /// Timestamp of when the column was created.
    pub created_at: DateTime<Utc>,
}

/// Input structure for creating a column.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ColumnInput {
    /// The column name. Must be between 1 and 50 characters.
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}
