//! Unified error type for habit operations, storage and configuration.

use thiserror::Error;

/// Every failure the crate can report to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// A draft, patch, completion date or snapshot was rejected.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The referenced habit id is not in the store.
    #[error("Habit not found: {id}")]
    HabitNotFound {
        /// The id that was looked up
        id: u64,
    },

    /// The habit is archived and must be restored before this operation.
    #[error("Habit {id} is archived")]
    HabitArchived {
        /// The archived habit's id
        id: u64,
    },

    /// config.toml could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A query or connection failed, or a stored row is corrupt.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A snapshot could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background writer task panicked or was cancelled.
    #[error("Background task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
