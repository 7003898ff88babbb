//! # topicbot-core
//!
//! Core types and traits for the topic bot: [`MessagingClient`], [`Handler`], [`Middleware`],
//! inbound [`Update`]s, outbound request parameters, the [`HandlerResponse`] / [`Reply`]
//! result, and tracing initialization. Transport-agnostic; used by the dispatcher, the
//! handlers and the Telegram adapter.

pub mod bot;
pub mod error;
pub mod logger;
pub mod markdown;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bot::MessagingClient;
pub use error::{BotError, HandlerError, Result};
pub use logger::{init_tracing, install_panic_hook};
pub use types::{
    handler_fn, CallbackQuery, Chat, ChatKind, ChatMember, ChatMemberStatus, EditMessageParams,
    FnHandler, Handler, HandlerResponse, InlineButton, InlineKeyboard, InlineQuery,
    InlineQueryArticle, Message, MessageRef, Middleware, ParseMode, PollAnswer, Reply,
    SendMessageParams, SendPollParams, SentMessage, Update, UpdateKind, User,
};
