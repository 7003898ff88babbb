//! Poll and vote models.
//!
//! Maps to the `poll` and `poll_vote` tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A call-to-subscribers message whose tally is edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    pub id: String,
    pub chat_id: i64,
    pub topic: String,
    pub result_message_id: i32,
}

impl Poll {
    /// Builds a poll keyed by the chat and the sent result message.
    pub fn new(chat_id: i64, result_message_id: i32, topic: impl Into<String>) -> Self {
        Self {
            id: Self::id_for(chat_id, result_message_id),
            chat_id,
            topic: topic.into(),
            result_message_id,
        }
    }

    pub fn id_for(chat_id: i64, message_id: i32) -> String {
        format!("{}:{}", chat_id, message_id)
    }
}

/// Vote value; the discriminant is the stored value and the callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum Vote {
    Up = 0,
    Down = 1,
}

impl Vote {
    pub fn callback_data(&self) -> &'static str {
        match self {
            Vote::Up => "0",
            Vote::Down => "1",
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i32>() {
            Ok(0) => Ok(Vote::Up),
            Ok(1) => Ok(Vote::Down),
            _ => Err(format!("invalid vote: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollVote {
    pub poll_id: String,
    pub user_id: i64,
    pub vote: Vote,
}

impl PollVote {
    pub fn new(poll_id: impl Into<String>, user_id: i64, vote: Vote) -> Self {
        Self {
            poll_id: poll_id.into(),
            user_id,
            vote,
        }
    }
}
