//! SQLite implementation of [`Store`].
//!
//! Uses SqlitePoolManager; the schema is created on construction with
//! `CREATE TABLE IF NOT EXISTS`, so opening an existing database is a no-op migration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{
    ChatEvent, ChatFeature, ChatRecord, Poll, PollVote, ScheduledTopic, TopicSummary,
    UserRecord, UserTopic,
};
use crate::sqlite_pool::SqlitePoolManager;
use crate::store::Store;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS chat (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chat_feature (
        chat_id INTEGER NOT NULL,
        feature TEXT NOT NULL,
        PRIMARY KEY (chat_id, feature)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user (
        id INTEGER PRIMARY KEY,
        first_name TEXT NOT NULL DEFAULT '',
        username TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_topic (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        topic TEXT NOT NULL,
        UNIQUE (chat_id, user_id, topic)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS poll (
        id TEXT PRIMARY KEY,
        chat_id INTEGER NOT NULL,
        topic TEXT NOT NULL,
        result_message_id INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS poll_vote (
        poll_id TEXT NOT NULL,
        user_id INTEGER NOT NULL,
        vote INTEGER NOT NULL,
        PRIMARY KEY (poll_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scheduled_topic (
        chat_id INTEGER NOT NULL,
        message_id INTEGER NOT NULL,
        topic TEXT NOT NULL,
        scheduled_at TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'created',
        PRIMARY KEY (chat_id, message_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event (
        chat_id INTEGER NOT NULL,
        message_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        happened_at TEXT NOT NULL,
        PRIMARY KEY (chat_id, message_id, name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_user_topic_chat_topic ON user_topic(chat_id, topic)",
    "CREATE INDEX IF NOT EXISTS idx_poll_chat_message ON poll(chat_id, result_message_id)",
    "CREATE INDEX IF NOT EXISTS idx_scheduled_topic_status ON scheduled_topic(status, scheduled_at)",
    "CREATE INDEX IF NOT EXISTS idx_event_chat_name ON event(chat_id, name)",
];

#[derive(Clone)]
pub struct SqliteStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteStore {
    /// Opens (or creates) the database and ensures the schema exists.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.migrate().await?;
        Ok(store)
    }

    /// Creates missing tables and indexes.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }

        info!(statements = SCHEMA.len(), "Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn save_chat(&self, chat: &ChatRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO chat (id, title) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            "#,
        )
        .bind(chat.id)
        .bind(&chat.title)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(chat_id = chat.id, "Chat saved");
        Ok(())
    }

    async fn find_chat(&self, chat_id: i64) -> Result<Option<ChatRecord>, StorageError> {
        let chat = sqlx::query_as::<_, ChatRecord>("SELECT id, title FROM chat WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(chat)
    }

    async fn chat_enables(&self, chat_id: i64, feature: ChatFeature) -> Result<bool, StorageError> {
        let (enabled,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM chat_feature WHERE chat_id = ? AND feature = ?)",
        )
        .bind(chat_id)
        .bind(feature.as_str())
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(enabled)
    }

    async fn enable_feature(&self, chat_id: i64, feature: ChatFeature) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO chat_feature (chat_id, feature) VALUES (?, ?)
            ON CONFLICT(chat_id, feature) DO NOTHING
            "#,
        )
        .bind(chat_id)
        .bind(feature.as_str())
        .execute(self.pool_manager.pool())
        .await?;

        info!(chat_id, feature = %feature, "Feature enabled");
        Ok(())
    }

    async fn disable_feature(
        &self,
        chat_id: i64,
        feature: ChatFeature,
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM chat_feature WHERE chat_id = ? AND feature = ?")
            .bind(chat_id)
            .bind(feature.as_str())
            .execute(self.pool_manager.pool())
            .await?;

        info!(chat_id, feature = %feature, "Feature disabled");
        Ok(())
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO user (id, first_name, username) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                username = excluded.username
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.username)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, first_name, username FROM user WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(user)
    }

    async fn exists_chat_topic(&self, chat_id: i64, topic: &str) -> Result<bool, StorageError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_topic WHERE chat_id = ? AND topic = ?)",
        )
        .bind(chat_id)
        .bind(topic)
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(exists)
    }

    async fn save_user_topic(&self, user_topic: &UserTopic) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO user_topic (chat_id, user_id, topic) VALUES (?, ?, ?)
            ON CONFLICT(chat_id, user_id, topic) DO NOTHING
            "#,
        )
        .bind(user_topic.chat_id)
        .bind(user_topic.user_id)
        .bind(&user_topic.topic)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    async fn delete_user_topic(&self, user_topic: &UserTopic) -> Result<u64, StorageError> {
        let result =
            sqlx::query("DELETE FROM user_topic WHERE chat_id = ? AND user_id = ? AND topic = ?")
                .bind(user_topic.chat_id)
                .bind(user_topic.user_id)
                .bind(&user_topic.topic)
                .execute(self.pool_manager.pool())
                .await?;
        Ok(result.rows_affected())
    }

    async fn find_user_chat_topics(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Vec<TopicSummary>, StorageError> {
        let topics = sqlx::query_as::<_, TopicSummary>(
            r#"
            SELECT
                ut.topic AS topic,
                (SELECT COUNT(*) FROM user_topic c
                    WHERE c.chat_id = ut.chat_id AND c.topic = ut.topic) AS subscribers
            FROM user_topic ut
            WHERE ut.chat_id = ? AND ut.user_id = ?
            ORDER BY ut.topic
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(topics)
    }

    async fn find_chat_topics(&self, chat_id: i64) -> Result<Vec<TopicSummary>, StorageError> {
        let topics = sqlx::query_as::<_, TopicSummary>(
            r#"
            SELECT topic, COUNT(*) AS subscribers
            FROM user_topic
            WHERE chat_id = ?
            GROUP BY topic
            ORDER BY subscribers DESC, topic
            "#,
        )
        .bind(chat_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(topics)
    }

    async fn find_users_by_topic(
        &self,
        chat_id: i64,
        topic: &str,
    ) -> Result<Vec<UserRecord>, StorageError> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.first_name, u.username
            FROM user u
            JOIN user_topic ut ON ut.user_id = u.id
            WHERE ut.chat_id = ? AND ut.topic = ?
            ORDER BY ut.id
            "#,
        )
        .bind(chat_id)
        .bind(topic)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(users)
    }

    async fn save_poll(&self, poll: &Poll) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO poll (id, chat_id, topic, result_message_id) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET result_message_id = excluded.result_message_id
            "#,
        )
        .bind(&poll.id)
        .bind(poll.chat_id)
        .bind(&poll.topic)
        .bind(poll.result_message_id)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(poll_id = %poll.id, topic = %poll.topic, "Poll saved");
        Ok(())
    }

    async fn find_poll_by_message_id(
        &self,
        chat_id: i64,
        message_id: i32,
    ) -> Result<Option<Poll>, StorageError> {
        let poll = sqlx::query_as::<_, Poll>(
            r#"
            SELECT id, chat_id, topic, result_message_id
            FROM poll
            WHERE chat_id = ? AND result_message_id = ?
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(poll)
    }

    async fn find_poll_vote(
        &self,
        poll_id: &str,
        user_id: i64,
    ) -> Result<Option<PollVote>, StorageError> {
        let vote = sqlx::query_as::<_, PollVote>(
            "SELECT poll_id, user_id, vote FROM poll_vote WHERE poll_id = ? AND user_id = ?",
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(vote)
    }

    async fn find_poll_votes(&self, poll_id: &str) -> Result<Vec<PollVote>, StorageError> {
        let votes = sqlx::query_as::<_, PollVote>(
            "SELECT poll_id, user_id, vote FROM poll_vote WHERE poll_id = ?",
        )
        .bind(poll_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(votes)
    }

    async fn save_poll_vote(&self, vote: &PollVote) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO poll_vote (poll_id, user_id, vote) VALUES (?, ?, ?)
            ON CONFLICT(poll_id, user_id) DO UPDATE SET vote = excluded.vote
            "#,
        )
        .bind(&vote.poll_id)
        .bind(vote.user_id)
        .bind(vote.vote)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    async fn delete_poll_vote(&self, poll_id: &str, user_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM poll_vote WHERE poll_id = ? AND user_id = ?")
            .bind(poll_id)
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }

    async fn save_scheduled_topic(&self, scheduled: &ScheduledTopic) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO scheduled_topic (chat_id, message_id, topic, scheduled_at, status)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(chat_id, message_id) DO UPDATE SET
                topic = excluded.topic,
                scheduled_at = excluded.scheduled_at,
                status = excluded.status
            "#,
        )
        .bind(scheduled.chat_id)
        .bind(scheduled.message_id)
        .bind(&scheduled.topic)
        .bind(scheduled.scheduled_at)
        .bind(scheduled.status)
        .execute(self.pool_manager.pool())
        .await?;

        info!(
            chat_id = scheduled.chat_id,
            message_id = scheduled.message_id,
            topic = %scheduled.topic,
            scheduled_at = %scheduled.scheduled_at,
            "Topic mention scheduled"
        );
        Ok(())
    }

    async fn find_due_scheduled_topics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ScheduledTopic>, StorageError> {
        let due = sqlx::query_as::<_, ScheduledTopic>(
            r#"
            SELECT chat_id, message_id, topic, scheduled_at, status
            FROM scheduled_topic
            WHERE status = 'created'
              AND datetime(scheduled_at) BETWEEN datetime(?) AND datetime(?)
            ORDER BY datetime(scheduled_at), message_id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(due)
    }

    async fn complete_scheduled_topic(
        &self,
        chat_id: i64,
        message_id: i32,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_topic SET status = 'completed'
            WHERE chat_id = ? AND message_id = ? AND status = 'created'
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn save_chat_event(&self, event: &ChatEvent) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO event (chat_id, message_id, name, happened_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(chat_id, message_id, name) DO UPDATE SET happened_at = excluded.happened_at
            "#,
        )
        .bind(event.chat_id)
        .bind(event.message_id)
        .bind(&event.name)
        .bind(event.happened_at)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(chat_id = event.chat_id, event = %event.name, "Event saved");
        Ok(())
    }

    async fn find_chat_events(
        &self,
        chat_id: i64,
        name: &str,
    ) -> Result<Vec<ChatEvent>, StorageError> {
        let events = sqlx::query_as::<_, ChatEvent>(
            r#"
            SELECT chat_id, message_id, name, happened_at
            FROM event
            WHERE chat_id = ? AND name = ?
            ORDER BY datetime(happened_at) DESC
            "#,
        )
        .bind(chat_id)
        .bind(name)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(events)
    }

    async fn delete_chat_event(
        &self,
        chat_id: i64,
        message_id: i32,
        name: &str,
    ) -> Result<u64, StorageError> {
        let result =
            sqlx::query("DELETE FROM event WHERE chat_id = ? AND message_id = ? AND name = ?")
                .bind(chat_id)
                .bind(message_id)
                .bind(name)
                .execute(self.pool_manager.pool())
                .await?;
        Ok(result.rows_affected())
    }
}
