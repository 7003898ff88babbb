//! # Handlers
//!
//! Command, text, inline and callback handlers for topic subscriptions and
//! subscriber calls:
//!
//! - [`StartHandler`] – `/start`
//! - [`TopicHandler`] – `/suba`, `/desca`, `/quem`, `/lista`, `/listudo`
//! - [`PollHandler`] – `/bora`, `#topic` messages, the vote buttons, `/pollo` and native
//!   poll answers
//! - [`ScheduleHandler`] – `/agenda`, with [`spawn_scheduled_mentions`] sending due mentions
//! - [`EventHandler`] – `/conta`, `/desconta`
//! - [`FeatureHandler`] – `/enable`, `/disable`
//! - [`InlineTopicHandler`] – inline queries suggesting a `#topic` call

mod events;
mod features;
mod inline;
mod poll;
mod schedule;
mod start;
mod topics;
mod validation;

pub use events::{count_summary, relative_duration, EventCommand, EventHandler};
pub use features::{FeatureAction, FeatureHandler};
pub use inline::InlineTopicHandler;
pub use poll::{cast_vote, PollCommand, PollGuard, PollHandler, PollLocks, Tally, VoteState};
pub use schedule::{
    mention_due_topics, next_occurrence, spawn_scheduled_mentions, ScheduleHandler,
    DEFAULT_SCHEDULE_INTERVAL, DUE_WINDOW_MINUTES, MENTIONS_PER_MESSAGE,
};
pub use start::StartHandler;
pub use topics::{TopicCommand, TopicHandler, MAX_TOPICS_PER_SUBSCRIBE};
pub use validation::{validate_topic, MAX_TOPIC_LEN};
