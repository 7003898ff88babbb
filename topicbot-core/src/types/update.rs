//! Inbound update: exactly one payload kind per update.

use serde::{Deserialize, Serialize};

use super::{CallbackQuery, InlineQuery, Message, MessageRef, PollAnswer, User};

/// Payload of an [`Update`]. Kinds the bot does not handle map to `Unsupported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateKind {
    Message(Message),
    CallbackQuery(CallbackQuery),
    InlineQuery(InlineQuery),
    PollAnswer(PollAnswer),
    Unsupported,
}

/// One inbound event from the messaging platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub id: i64,
    pub kind: UpdateKind,
}

impl Update {
    pub fn new(id: i64, kind: UpdateKind) -> Self {
        Self { id, kind }
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.kind {
            UpdateKind::CallbackQuery(query) => Some(query),
            _ => None,
        }
    }

    pub fn inline_query(&self) -> Option<&InlineQuery> {
        match &self.kind {
            UpdateKind::InlineQuery(query) => Some(query),
            _ => None,
        }
    }

    pub fn poll_answer(&self) -> Option<&PollAnswer> {
        match &self.kind {
            UpdateKind::PollAnswer(answer) => Some(answer),
            _ => None,
        }
    }

    /// Message text, empty when the update is not a message.
    pub fn text(&self) -> &str {
        self.message().map(|m| m.text.as_str()).unwrap_or("")
    }

    /// User who caused the update, when known.
    pub fn sender(&self) -> Option<&User> {
        match &self.kind {
            UpdateKind::Message(message) => message.from.as_ref(),
            UpdateKind::CallbackQuery(query) => Some(&query.from),
            UpdateKind::InlineQuery(query) => Some(&query.from),
            UpdateKind::PollAnswer(answer) => answer.user.as_ref(),
            UpdateKind::Unsupported => None,
        }
    }

    /// Chat and message a reply to this update is threaded to.
    ///
    /// Messages reply to themselves; callback queries reply to the message carrying the
    /// button. Inline queries and poll answers have no chat to reply into.
    pub fn origin(&self) -> Option<MessageRef> {
        match &self.kind {
            UpdateKind::Message(message) => Some(MessageRef {
                chat_id: message.chat.id,
                message_id: message.id,
            }),
            UpdateKind::CallbackQuery(query) => query.message,
            _ => None,
        }
    }

    /// Short name of the payload kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            UpdateKind::Message(_) => "message",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::InlineQuery(_) => "inline_query",
            UpdateKind::PollAnswer(_) => "poll_answer",
            UpdateKind::Unsupported => "unsupported",
        }
    }
}
