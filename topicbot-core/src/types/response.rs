//! Handler result type.

use serde::{Deserialize, Serialize};

/// Text formatting applied by the platform when rendering a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    Plain,
    MarkdownV2,
}

/// Text to send back to the user, threaded to the triggering message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::MarkdownV2,
        }
    }
}

/// Successful handler outcome. Failures travel in the `Err` side of
/// [`Result`](crate::Result).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Handled; nothing to send.
    Done,
    /// Handled; the dispatcher sends this reply to the originating chat.
    Reply(Reply),
}

impl HandlerResponse {
    /// Shorthand for `HandlerResponse::Reply(Reply::text(text))`.
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(Reply::text(text))
    }
}

impl From<Reply> for HandlerResponse {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}
