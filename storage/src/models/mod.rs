//! Persistence models for the storage crate.

mod chat;
mod event;
mod poll;
mod schedule;
mod user;

pub use chat::{ChatFeature, ChatRecord};
pub use event::ChatEvent;
pub use poll::{Poll, PollVote, Vote};
pub use schedule::{ScheduleStatus, ScheduledTopic};
pub use user::{TopicSummary, UserRecord, UserTopic};
