//! Store trait: the persistence operations handlers depend on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::models::{
    ChatEvent, ChatFeature, ChatRecord, Poll, PollVote, ScheduledTopic, TopicSummary,
    UserRecord, UserTopic,
};

#[async_trait]
pub trait Store: Send + Sync {
    /// Upserts the chat (updates the title).
    async fn save_chat(&self, chat: &ChatRecord) -> Result<(), StorageError>;
    async fn find_chat(&self, chat_id: i64) -> Result<Option<ChatRecord>, StorageError>;

    async fn chat_enables(&self, chat_id: i64, feature: ChatFeature) -> Result<bool, StorageError>;
    async fn enable_feature(&self, chat_id: i64, feature: ChatFeature) -> Result<(), StorageError>;
    async fn disable_feature(&self, chat_id: i64, feature: ChatFeature)
        -> Result<(), StorageError>;

    /// Upserts the user (updates first name and username).
    async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError>;
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, StorageError>;

    /// True when anyone in the chat is subscribed to the topic.
    async fn exists_chat_topic(&self, chat_id: i64, topic: &str) -> Result<bool, StorageError>;
    /// Idempotent: subscribing twice keeps one row.
    async fn save_user_topic(&self, user_topic: &UserTopic) -> Result<(), StorageError>;
    /// Returns the number of rows removed.
    async fn delete_user_topic(&self, user_topic: &UserTopic) -> Result<u64, StorageError>;
    async fn find_user_chat_topics(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Vec<TopicSummary>, StorageError>;
    /// All topics of the chat, most subscribed first.
    async fn find_chat_topics(&self, chat_id: i64) -> Result<Vec<TopicSummary>, StorageError>;
    /// Subscribers in subscription order.
    async fn find_users_by_topic(
        &self,
        chat_id: i64,
        topic: &str,
    ) -> Result<Vec<UserRecord>, StorageError>;

    /// Upserts on id, updating the result message id.
    async fn save_poll(&self, poll: &Poll) -> Result<(), StorageError>;
    async fn find_poll_by_message_id(
        &self,
        chat_id: i64,
        message_id: i32,
    ) -> Result<Option<Poll>, StorageError>;

    async fn find_poll_vote(
        &self,
        poll_id: &str,
        user_id: i64,
    ) -> Result<Option<PollVote>, StorageError>;
    async fn find_poll_votes(&self, poll_id: &str) -> Result<Vec<PollVote>, StorageError>;
    /// Upserts on `(poll_id, user_id)`.
    async fn save_poll_vote(&self, vote: &PollVote) -> Result<(), StorageError>;
    async fn delete_poll_vote(&self, poll_id: &str, user_id: i64) -> Result<(), StorageError>;

    /// Upserts on `(chat_id, message_id)`.
    async fn save_scheduled_topic(&self, scheduled: &ScheduledTopic) -> Result<(), StorageError>;
    /// Pending mentions scheduled within `[from, to]`, earliest first.
    async fn find_due_scheduled_topics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ScheduledTopic>, StorageError>;
    /// Marks a pending mention completed; returns the number of rows changed.
    async fn complete_scheduled_topic(
        &self,
        chat_id: i64,
        message_id: i32,
    ) -> Result<u64, StorageError>;

    /// Upserts on `(chat_id, message_id, name)`, updating the time.
    async fn save_chat_event(&self, event: &ChatEvent) -> Result<(), StorageError>;
    /// Occurrences of the named event, most recent first.
    async fn find_chat_events(
        &self,
        chat_id: i64,
        name: &str,
    ) -> Result<Vec<ChatEvent>, StorageError>;
    /// Returns the number of rows removed.
    async fn delete_chat_event(
        &self,
        chat_id: i64,
        message_id: i32,
        name: &str,
    ) -> Result<u64, StorageError>;
}
