//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! every error condition the core can produce, from store failures to membership
//! violations.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses with JSON bodies.
//! It also provides `From` trait implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, and
//! `bcrypt::BcryptError`, allowing for easy conversion using the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to one of the stable error kinds the core exposes
/// to the route layer, which maps them to HTTP status codes.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failure: missing, malformed or expired token, or a token
    /// whose embedded user no longer exists (HTTP 401).
    Unauthorized(String),
    /// Login with an unknown email or a non-matching password (HTTP 401).
    /// Deliberately carries no detail about which of the two failed.
    InvalidCredentials,
    /// The acting user is not a member of the board owning the resource,
    /// or tried to delete someone else's comment (HTTP 403).
    Forbidden(String),
    /// A username/email collision during registration (HTTP 400).
    Duplicate(String),
    /// The referenced board does not exist (HTTP 404).
    BoardNotFound,
    /// The referenced task does not exist, or its board was removed (HTTP 404).
    TaskNotFound,
    /// Some other resource (e.g. a comment) was not found (HTTP 404).
    NotFound(String),
    /// A write lost an optimistic-concurrency race: the document revision
    /// changed between read and write (HTTP 409).
    Conflict(String),
    /// Input validation failed; the message aggregates every failing field
    /// (HTTP 422 Unprocessable Entity).
    Validation(String),
    /// An error originating from the persistent store (HTTP 500).
    /// Always surfaced, never retried by this layer.
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            AppError::BoardNotFound => write!(f, "Board not found"),
            AppError::TaskNotFound => write!(f, "Task not found"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This implementation allows Actix Web to automatically translate `AppError`
/// results from handlers into the correct HTTP status codes and JSON error responses.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(json!({
                "error": "Invalid credentials"
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::Duplicate(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::BoardNotFound => HttpResponse::NotFound().json(json!({
                "error": "Board not found"
            })),
            AppError::TaskNotFound => HttpResponse::NotFound().json(json!({
                "error": "Task not found"
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "error": msg
            })),
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            // Store errors are presented as generic internal server errors to the client.
            AppError::Database(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            AppError::Internal(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` is mapped to `AppError::NotFound`,
/// while other database errors become `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// `ValidationErrors` already aggregates every failing field, so the resulting
/// message enumerates all violated constraints rather than only the first.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// This is typically used when JWT processing (e.g., verification) fails.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
///
/// This handles errors during password hashing or verification.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
