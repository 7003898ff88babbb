//! Parameters and results of outbound messaging calls.

use serde::{Deserialize, Serialize};

use super::{ParseMode, Reply};

/// One inline keyboard button carrying callback data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageParams {
    pub chat_id: i64,
    pub text: String,
    pub reply_to_message_id: Option<i32>,
    pub parse_mode: ParseMode,
    /// Send even if the replied-to message no longer exists.
    pub allow_sending_without_reply: bool,
    pub reply_markup: Option<InlineKeyboard>,
}

impl SendMessageParams {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to_message_id: None,
            parse_mode: ParseMode::Plain,
            allow_sending_without_reply: false,
            reply_markup: None,
        }
    }

    /// Reply addressed to `message_id`, tolerant of that message having been deleted.
    pub fn from_reply(chat_id: i64, message_id: i32, reply: Reply) -> Self {
        Self {
            chat_id,
            text: reply.text,
            reply_to_message_id: Some(message_id),
            parse_mode: reply.parse_mode,
            allow_sending_without_reply: true,
            reply_markup: None,
        }
    }

    pub fn reply_to(mut self, message_id: i32) -> Self {
        self.reply_to_message_id = Some(message_id);
        self.allow_sending_without_reply = true;
        self
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn reply_markup(mut self, keyboard: InlineKeyboard) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMessageParams {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: String,
    pub parse_mode: ParseMode,
    pub reply_markup: Option<InlineKeyboard>,
}

impl EditMessageParams {
    pub fn new(chat_id: i64, message_id: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            text: text.into(),
            parse_mode: ParseMode::Plain,
            reply_markup: None,
        }
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn reply_markup(mut self, keyboard: InlineKeyboard) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// A native platform poll. Polls the bot sends name their voters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPollParams {
    pub chat_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub is_anonymous: bool,
}

impl SendPollParams {
    pub fn new(chat_id: i64, question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            chat_id,
            question: question.into(),
            options,
            is_anonymous: false,
        }
    }
}

/// Identity of a message the bot just sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub user_id: i64,
    pub status: ChatMemberStatus,
}

impl ChatMember {
    pub fn is_admin(&self) -> bool {
        matches!(
            self.status,
            ChatMemberStatus::Creator | ChatMemberStatus::Administrator
        )
    }
}

/// Text article offered as an inline query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineQueryArticle {
    pub id: String,
    pub title: String,
    pub message_text: String,
}
