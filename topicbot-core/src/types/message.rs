//! Inbound payloads carried by an [`Update`](super::Update).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Chat, User};

/// A chat message. `text` is empty for non-text messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i32,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: String,
    pub date: DateTime<Utc>,
    pub reply_to_message: Option<Box<Message>>,
    /// True when the message was forwarded from another user, chat or hidden sender.
    pub is_forwarded: bool,
}

impl Message {
    /// Returns the command argument: everything after the first whitespace, if any.
    pub fn command_argument(&self) -> Option<&str> {
        self.text.split_once(char::is_whitespace).map(|(_, rest)| rest)
    }
}

/// Reference to a message by chat and id (e.g. the message a callback button belongs to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Press of an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Message carrying the keyboard; absent for buttons on inline-mode messages.
    pub message: Option<MessageRef>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
}

/// Answer to a native platform poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollAnswer {
    pub poll_id: String,
    pub user: Option<User>,
    pub option_ids: Vec<u32>,
}
