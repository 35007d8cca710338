//! Storage errors.

use super::error_code::{self, LintelErrorCode};

/// Errors from the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: i64, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid stored value in {column}: {value}")]
    CorruptRow { column: &'static str, value: String },
}

impl StorageError {
    /// Wrap a rusqlite-shaped error message. Used by every query module.
    pub fn sqlite(message: impl std::fmt::Display) -> Self {
        StorageError::SqliteError {
            message: message.to_string(),
        }
    }
}

impl LintelErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
