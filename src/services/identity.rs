//! Identity directory: user registration, login, and token issuance.
//!
//! Uniqueness is checked as two independent lookups, email first and then
//! username; the database constraints back them up under concurrent
//! registration.

use crate::auth::{generate_token, hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{User, UserCredentials};
use sqlx::PgPool;
use validator::Validate;

/// Stores user records and issues bearer tokens for them.
pub struct IdentityDirectory {
    pool: PgPool,
}

impl IdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a user account and issues a token for it.
    ///
    /// Fails with `Duplicate` when the email (checked first) or the username
    /// is already taken, and with `Validation` on field constraint violations.
    /// The password is bcrypt-hashed before storage; the returned profile
    /// never includes the hash.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let email = request.email.to_lowercase();

        let existing_email: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
        if existing_email.is_some() {
            return Err(AppError::Duplicate(
                "A user with this email already exists".into(),
            ));
        }

        let existing_username: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(&request.username)
                .fetch_optional(&self.pool)
                .await?;
        if existing_username.is_some() {
            return Err(AppError::Duplicate(
                "A user with this username already exists".into(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let user: User = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, username, email, created_at",
        )
        .bind(&request.username)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        let token = generate_token(user.id)?;
        Ok(AuthResponse { user, token })
    }

    /// Verifies a login attempt and issues a fresh token.
    ///
    /// The stored hash is loaded only here and compared through bcrypt
    /// verification. Unknown email and wrong password both collapse into
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let credentials: Option<UserCredentials> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE email = $1",
        )
        .bind(request.email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        let credentials = credentials.ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&request.password, &credentials.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let user = credentials.into_public();
        let token = generate_token(user.id)?;
        Ok(AuthResponse { user, token })
    }
}
