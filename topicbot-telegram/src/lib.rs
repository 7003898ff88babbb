//! # topicbot-telegram
//!
//! Telegram connectivity for the topic bot: [`TelegramClient`] implements
//! [`topicbot_core::MessagingClient`] over teloxide, [`convert`] maps teloxide updates to core
//! [`topicbot_core::Update`]s, and [`spawn_update_poller`] feeds them to the dispatcher.
//! No persistence or command logic lives here.

mod client;
pub mod convert;
mod poller;

pub use client::{create_bot, TelegramClient};
pub use convert::to_core_update;
pub use poller::spawn_update_poller;
