//! Storage error types.
//!
//! Used by store implementations and callers of storage APIs.

use thiserror::Error;
use topicbot_core::BotError;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for BotError {
    fn from(err: StorageError) -> Self {
        BotError::Storage(err.to_string())
    }
}
