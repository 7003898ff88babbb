//! Event counters: `/conta <event>` and `/desconta <event>`.
//!
//! Replying to a message with `/conta <event>` records that the event happened at that
//! message's time; only the bot owner may record or remove occurrences. Without a reply,
//! `/conta <event>` reports how many times it happened and how long ago the last one was.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use middleware::AdminPolicy;
use storage::{ChatEvent, Store};
use topicbot_core::{
    Handler, HandlerError, HandlerResponse, Message, MessagingClient, Result, Update,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCommand {
    /// `/conta <event>`, optionally replying to the message where it happened.
    Count,
    /// `/desconta <event>` replying to a counted message.
    Uncount,
}

pub struct EventHandler {
    command: EventCommand,
    store: Arc<dyn Store>,
    admins: AdminPolicy,
}

impl EventHandler {
    pub fn new(command: EventCommand, store: Arc<dyn Store>, admins: AdminPolicy) -> Self {
        Self {
            command,
            store,
            admins,
        }
    }

    fn sent_by_owner(&self, message: &Message) -> bool {
        message
            .from
            .as_ref()
            .is_some_and(|from| self.admins.is_owner(from.id))
    }

    async fn count(&self, message: &Message, name: &str) -> Result<HandlerResponse> {
        let chat_id = message.chat.id;

        if let Some(replied) = &message.reply_to_message {
            if !self.sent_by_owner(message) {
                return Ok(HandlerResponse::reply("Only the bot owner can count events."));
            }
            self.store
                .save_chat_event(&ChatEvent::new(chat_id, replied.id, name, replied.date))
                .await?;
            info!(chat_id, message_id = replied.id, event = name, "Event counted");
            return Ok(HandlerResponse::reply(format!("Counted {}.", name)));
        }

        let events = self.store.find_chat_events(chat_id, name).await?;
        Ok(HandlerResponse::reply(count_summary(name, &events, Utc::now())))
    }

    async fn uncount(&self, message: &Message, name: &str) -> Result<HandlerResponse> {
        let Some(replied) = &message.reply_to_message else {
            return Ok(HandlerResponse::reply(
                "Reply to the message you want to uncount.",
            ));
        };
        if !self.sent_by_owner(message) {
            return Ok(HandlerResponse::reply("Only the bot owner can uncount events."));
        }

        let removed = self
            .store
            .delete_chat_event(message.chat.id, replied.id, name)
            .await?;
        if removed == 0 {
            return Ok(HandlerResponse::reply(format!(
                "That message was not counted as {}.",
                name
            )));
        }
        info!(chat_id = message.chat.id, message_id = replied.id, event = name, "Event uncounted");
        Ok(HandlerResponse::reply("Uncounted."))
    }
}

/// `"<name>: N times. Last time X ago"`; `events` are most recent first.
pub fn count_summary(name: &str, events: &[ChatEvent], now: DateTime<Utc>) -> String {
    let Some(last) = events.first() else {
        return format!("{}: 0 times", name);
    };
    let ago = relative_duration(now - last.happened_at);
    if events.len() == 1 {
        format!("{}: 1 time, {} ago", name, ago)
    } else {
        format!("{}: {} times. Last time {} ago", name, events.len(), ago)
    }
}

/// The two largest non-zero units of `elapsed`, e.g. "1 hour and 2 minutes".
pub fn relative_duration(elapsed: TimeDelta) -> String {
    const UNITS: [(&str, &str, i64); 4] = [
        ("day", "days", 86_400),
        ("hour", "hours", 3_600),
        ("minute", "minutes", 60),
        ("second", "seconds", 1),
    ];

    let mut remaining = elapsed.num_seconds().max(0);
    let mut parts = Vec::new();
    for (singular, plural, seconds) in UNITS {
        if parts.len() == 2 {
            break;
        }
        let amount = remaining / seconds;
        if amount == 0 {
            continue;
        }
        remaining -= amount * seconds;
        let unit = if amount == 1 { singular } else { plural };
        parts.push(format!("{} {}", amount, unit));
    }

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(" and ")
    }
}

#[async_trait]
impl Handler for EventHandler {
    async fn handle(&self, _bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let message = update
            .message()
            .ok_or(HandlerError::MissingPayload("message"))?;

        let name = message.command_argument().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return Ok(HandlerResponse::reply("Which event?"));
        }

        match self.command {
            EventCommand::Count => self.count(message, name).await,
            EventCommand::Uncount => self.uncount(message, name).await,
        }
    }
}
