//! Scheduled topic mentions.
//!
//! `/agenda #topic HH:MM` records a mention for the next occurrence of that local time.
//! A background worker wakes up every few seconds, mentions the subscribers of every due
//! topic in batches of [`MENTIONS_PER_MESSAGE`], each batch threaded to the scheduling
//! message, and marks the mention completed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use storage::{ScheduledTopic, Store};
use tokio::task::JoinHandle;
use topicbot_core::markdown::mention;
use topicbot_core::{
    Handler, HandlerError, HandlerResponse, MessagingClient, ParseMode, Result,
    SendMessageParams, Update,
};
use tracing::{debug, error, info, warn};

const USAGE: &str = "format: /agenda #topic 17:00";

pub const MENTIONS_PER_MESSAGE: usize = 4;

/// A mention is sent if the worker sees it at most this many minutes after its time.
pub const DUE_WINDOW_MINUTES: i64 = 5;

pub const DEFAULT_SCHEDULE_INTERVAL: Duration = Duration::from_secs(10);

static SCHEDULED_TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[a-z0-9_]+$").expect("Failed to compile scheduled topic regex"));

/// The first `HH:MM` in `now`'s time zone that is not before `now`: today, or tomorrow
/// when today's has passed.
pub fn next_occurrence<Tz: TimeZone>(time: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let zone = now.timezone();

    let today = now.date_naive().and_time(time);
    let candidate = zone.from_local_datetime(&today).earliest()?;
    if candidate >= *now {
        return Some(candidate);
    }
    let tomorrow = today.checked_add_signed(TimeDelta::days(1))?;
    zone.from_local_datetime(&tomorrow).earliest()
}

/// `/agenda #topic HH:MM`
pub struct ScheduleHandler {
    store: Arc<dyn Store>,
}

impl ScheduleHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for ScheduleHandler {
    async fn handle(&self, _bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let message = update
            .message()
            .ok_or(HandlerError::MissingPayload("message"))?;

        let fields: Vec<&str> = message.text.split_whitespace().collect();
        let [_, topic, time] = fields.as_slice() else {
            return Ok(HandlerResponse::reply(USAGE));
        };
        if !SCHEDULED_TOPIC_RE.is_match(topic) {
            return Ok(HandlerResponse::reply(USAGE));
        }
        let Some(when) = next_occurrence(time, &Local::now()) else {
            return Ok(HandlerResponse::reply(USAGE));
        };

        self.store
            .save_scheduled_topic(&ScheduledTopic::new(
                message.chat.id,
                message.id,
                *topic,
                when.with_timezone(&Utc),
            ))
            .await?;

        Ok(HandlerResponse::reply(format!(
            "Scheduled for {}.",
            when.format("%H:%M, day %d")
        )))
    }
}

/// Mentions the subscribers of every topic due at `now`. Returns how many scheduled
/// mentions were completed; a failing one is logged and retried on the next pass while
/// it is still inside the due window.
pub async fn mention_due_topics(
    bot: &dyn MessagingClient,
    store: &dyn Store,
    now: DateTime<Utc>,
) -> Result<usize> {
    let from = now - TimeDelta::minutes(DUE_WINDOW_MINUTES);
    let due = store.find_due_scheduled_topics(from, now).await?;

    let mut completed = 0;
    for scheduled in &due {
        match mention_subscribers(bot, store, scheduled).await {
            Ok(()) => completed += 1,
            Err(e) => warn!(
                chat_id = scheduled.chat_id,
                message_id = scheduled.message_id,
                error = %e,
                "Scheduled mention failed"
            ),
        }
    }
    Ok(completed)
}

async fn mention_subscribers(
    bot: &dyn MessagingClient,
    store: &dyn Store,
    scheduled: &ScheduledTopic,
) -> Result<()> {
    let users = store
        .find_users_by_topic(scheduled.chat_id, &scheduled.topic)
        .await?;

    for batch in users.chunks(MENTIONS_PER_MESSAGE) {
        let text = batch
            .iter()
            .map(|user| mention(user.display_name(), user.id))
            .collect::<Vec<_>>()
            .join(" ");
        bot.send_message(
            SendMessageParams::new(scheduled.chat_id, text)
                .reply_to(scheduled.message_id)
                .parse_mode(ParseMode::MarkdownV2),
        )
        .await?;
    }

    store
        .complete_scheduled_topic(scheduled.chat_id, scheduled.message_id)
        .await?;
    info!(
        chat_id = scheduled.chat_id,
        message_id = scheduled.message_id,
        topic = %scheduled.topic,
        subscribers = users.len(),
        "Scheduled topic mentioned"
    );
    Ok(())
}

/// Runs [`mention_due_topics`] every `every` until the task is aborted.
pub fn spawn_scheduled_mentions(
    bot: Arc<dyn MessagingClient>,
    store: Arc<dyn Store>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match mention_due_topics(bot.as_ref(), store.as_ref(), Utc::now()).await {
                Ok(0) => debug!("No scheduled topic due"),
                Ok(completed) => debug!(completed, "Scheduled mention pass done"),
                Err(e) => error!(error = %e, "Scheduled mention pass failed"),
            }
        }
    })
}
