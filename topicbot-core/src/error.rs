//! Error types for the bot core.
//!
//! [`BotError`] is the top-level error; [`HandlerError`] is used for handler failures.

use thiserror::Error;

/// Top-level error (storage, messaging transport, handler, config, IO).
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by handlers.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Update has no {0}")]
    MissingPayload(&'static str),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    #[error("No poll for message {message_id} in chat {chat_id}")]
    PollNotFound { chat_id: i64, message_id: i32 },
}

/// Result type for core operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
