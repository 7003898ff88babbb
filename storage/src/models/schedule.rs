//! Scheduled topic mentions.
//!
//! Maps to the `scheduled_topic` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Created,
    Completed,
}

/// A mention of a topic's subscribers due at `scheduled_at`, threaded to the message that
/// scheduled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduledTopic {
    pub chat_id: i64,
    pub message_id: i32,
    pub topic: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: ScheduleStatus,
}

impl ScheduledTopic {
    pub fn new(
        chat_id: i64,
        message_id: i32,
        topic: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            topic: topic.into(),
            scheduled_at,
            status: ScheduleStatus::Created,
        }
    }
}
