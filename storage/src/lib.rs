//! Storage crate: chat, user, topic subscription, poll, scheduled mention and event
//! persistence.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – ChatRecord, ChatFeature, UserRecord, UserTopic, TopicSummary, Poll, PollVote,
//!   Vote, ScheduledTopic, ChatEvent
//! - [`store`] – Store trait consumed by handlers
//! - [`sqlite_store`] – SqliteStore (SQLite via sqlx)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod models;
mod sqlite_pool;
mod sqlite_store;
mod store;


pub use error::StorageError;
pub use models::{
    ChatEvent, ChatFeature, ChatRecord, Poll, PollVote, ScheduleStatus, ScheduledTopic,
    TopicSummary, UserRecord, UserTopic, Vote,
};
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteStore;
pub use store::Store;
