//! Shared error and result types

use thiserror::Error;

/// Errors surfaced by the moderation service
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Listing (or other document) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Write conflicts with existing state (e.g. duplicate report)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No caller identity was forwarded
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is known but not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Document store failure
    #[error("Database error: {0}")]
    Database(String),

    /// NATS failure
    #[error("NATS error: {0}")]
    Nats(String),

    /// Bad configuration (term list, CLI args)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModerationError {
    /// Machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ModerationError::NotFound(_) => "NOT_FOUND",
            ModerationError::Validation(_) => "VALIDATION_ERROR",
            ModerationError::Conflict(_) => "CONFLICT",
            ModerationError::Unauthorized(_) => "UNAUTHORIZED",
            ModerationError::Forbidden(_) => "FORBIDDEN",
            ModerationError::Database(_) => "DB_ERROR",
            ModerationError::Nats(_) => "NATS_ERROR",
            ModerationError::Config(_) => "CONFIG_ERROR",
            ModerationError::Io(_) => "IO_ERROR",
            ModerationError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;
