use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public view of a user account.
///
/// The password hash is deliberately absent from this type so it can never
/// leak into a response body; login code that needs the hash uses
/// [`UserCredentials`] instead.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Internal row used only to verify a login attempt.
///
/// Never serialized: this is the one place the stored bcrypt hash is loaded.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserCredentials {
    /// Strips the credential hash, leaving the public profile.
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Minimal author profile resolved for comment display (username + email).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct AuthorProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
}
