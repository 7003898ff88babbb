//! User record and topic subscription models.
//!
//! Maps to the `user` and `user_topic` tables.

use serde::{Deserialize, Serialize};
use topicbot_core::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub username: String,
}

impl UserRecord {
    /// Username when set, otherwise the first name.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.first_name
        } else {
            &self.username
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            username: user.username.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserTopic {
    pub chat_id: i64,
    pub user_id: i64,
    pub topic: String,
}

impl UserTopic {
    pub fn new(chat_id: i64, user_id: i64, topic: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            topic: topic.into(),
        }
    }
}

/// A topic with its subscriber count, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopicSummary {
    pub topic: String,
    pub subscribers: i64,
}
