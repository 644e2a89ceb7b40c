//! Core error types for Gatekeeper
//!
//! Every error that reaches a client is rendered as an [`ErrorBody`], which carries the
//! HTTP status and a short message and nothing else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for store and service operations
#[derive(Error, Debug)]
pub enum GkError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Standard Result type for Gatekeeper operations
pub type GkResult<T> = Result<T, GkError>;

impl GkError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        GkError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        GkError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        GkError::Forbidden {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GkError::NotFound { .. } => 404,
            GkError::BadRequest { .. } => 400,
            GkError::Unauthorized { .. } => 401,
            GkError::Forbidden { .. } => 403,
            GkError::Database(_) | GkError::Internal(_) | GkError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GkError::NotFound { .. } => "not_found",
            GkError::BadRequest { .. } => "bad_request",
            GkError::Unauthorized { .. } => "unauthorized",
            GkError::Forbidden { .. } => "forbidden",
            GkError::Database(_) => "database_error",
            GkError::Internal(_) => "internal_error",
            GkError::Config(_) => "configuration_error",
        }
    }

    /// Client-facing message. Database and internal details are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            GkError::NotFound { entity, .. } => format!("{} not found", entity),
            GkError::BadRequest { message }
            | GkError::Unauthorized { message }
            | GkError::Forbidden { message } => message.clone(),
            GkError::Database(_) | GkError::Internal(_) | GkError::Config(_) => {
                "Internal Server Error".to_string()
            }
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.status_code(), self.public_message())
    }
}

/// Wire body of every failed response: `{status, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
