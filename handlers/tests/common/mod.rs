//! Shared setup for handler integration tests: an in-memory store with a started chat.

use std::sync::Arc;

use storage::{ChatRecord, SqliteStore, Store, UserRecord, UserTopic};

pub const CHAT: i64 = -100;

pub async fn started_store() -> Arc<SqliteStore> {
    let store = SqliteStore::new("sqlite::memory:")
        .await
        .expect("Failed to create store");
    store
        .save_chat(&ChatRecord::new(CHAT, "Test group"))
        .await
        .expect("Failed to save chat");
    Arc::new(store)
}

/// Saves the user and subscribes them to `topic` in [`CHAT`].
#[allow(dead_code)]
pub async fn subscribe(store: &SqliteStore, user_id: i64, name: &str, topic: &str) {
    store
        .save_user(&UserRecord {
            id: user_id,
            first_name: name.to_string(),
            username: String::new(),
        })
        .await
        .expect("Failed to save user");
    store
        .save_user_topic(&UserTopic::new(CHAT, user_id, topic))
        .await
        .expect("Failed to save subscription");
}
