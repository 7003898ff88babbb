//! Core types: inbound updates, outbound request parameters, handler response, and the
//! Handler / Middleware traits.
//!
//! Types are split into one file per main type for easier navigation.

mod chat;
mod handler;
mod message;
mod outbound;
mod response;
mod update;
mod user;

pub use chat::{Chat, ChatKind};
pub use handler::{handler_fn, FnHandler, Handler, Middleware};
pub use message::{CallbackQuery, InlineQuery, Message, MessageRef, PollAnswer};
pub use outbound::{
    ChatMember, ChatMemberStatus, EditMessageParams, InlineButton, InlineKeyboard,
    InlineQueryArticle, SendMessageParams, SendPollParams, SentMessage,
};
pub use response::{HandlerResponse, ParseMode, Reply};
pub use update::{Update, UpdateKind};
pub use user::User;
