//! # topicbot-cli
//!
//! Argument parsing, config loading and the wiring of store, Telegram client, handlers and
//! middlewares into the running bot.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{build_dispatcher, run_bot, run_migrate};
pub use cli::{Cli, Commands};
pub use config::BotConfig;
