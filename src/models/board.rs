use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A board shared between its owner and a set of member users.
///
/// Membership is the single access rule for every column and task below the
/// board; the owner is always a member.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Board {
    /// Unique identifier for the board (UUID v4).
    pub id: Uuid,
    /// The board name (1-100 characters).
    pub name: String,
    /// Optional description (up to 500 characters).
    pub description: Option<String>,
    /// Identifier of the owning user.
    pub owner: i32,
    /// User ids with access to the board. Always contains `owner`.
    pub members: Vec<i32>,
    /// Whether the board is flagged public.
    pub is_public: bool,
    /// Per-board counter backing atomic column position assignment.
    /// Internal bookkeeping, not part of the API surface.
    #[serde(skip_serializing, default)]
    pub next_position: i32,
    /// Timestamp of when the board was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the board.
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Membership decision used by every board-scoped access check.
    pub fn is_member(&self, user_id: i32) -> bool {
        self.members.contains(&user_id)
    }
}

/// Input structure for creating a board.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BoardInput {
    /// The board name. Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// An optional description. Maximum length of 500 characters if provided.
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Whether the board should be public. Defaults to false.
    pub is_public: Option<bool>,
}
