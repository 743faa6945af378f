//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` shared by every layer of the
//! application. Repositories wrap low-level store failures into it, use cases pass it
//! through or reclassify it, and the HTTP boundary turns it into a status code.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and middleware
//! can return it directly. The message carried by each variant is user-visible and is
//! emitted verbatim as `{"error": "<message>"}`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// The variant decides the HTTP status; the message is what the client sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Client input or state violation (HTTP 400).
    BadRequest(String),
    /// A requested entity does not exist (HTTP 404).
    NotFound(String),
    /// Missing or invalid credentials (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but the role is not allowed to perform the action (HTTP 403).
    Forbidden(String),
    /// Unexpected store or infrastructure failure (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    /// The user-visible message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Repositories usually map errors themselves so they can pick a precise message;
/// this covers the remaining `?` sites.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            other => {
                log::error!("store error: {}", other);
                AppError::InternalServerError("Internal server error".into())
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::BadRequest`.
///
/// Custom field messages are preferred over the generated description.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let mut messages: Vec<String> = error
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        messages.sort();

        if messages.is_empty() {
            AppError::BadRequest(error.to_string())
        } else {
            AppError::BadRequest(messages.join(", "))
        }
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        let msg = match error.kind() {
            JwtErrorKind::ExpiredSignature => "token has expired",
            JwtErrorKind::InvalidSignature => "token signature is invalid",
            JwtErrorKind::InvalidAlgorithm => "unexpected signing method",
            _ => "invalid token",
        };
        AppError::Unauthorized(msg.into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("bcrypt: {}", error))
    }
}
