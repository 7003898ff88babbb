//! Counted chat events: a named event attached to the message where it happened.
//!
//! Maps to the `event` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatEvent {
    pub chat_id: i64,
    pub message_id: i32,
    pub name: String,
    pub happened_at: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(
        chat_id: i64,
        message_id: i32,
        name: impl Into<String>,
        happened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            name: name.into(),
            happened_at,
        }
    }
}
