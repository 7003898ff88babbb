//! Calling a topic's subscribers and the vote buttons on the call message.
//!
//! `/bora <topic>` (or a plain `#topic` message) sends a tally message mentioning every
//! subscriber, with 👍/👎 buttons. Each button press toggles the voter's vote and edits the
//! tally in place. Presses on the same poll are serialized.
//!
//! `/pollo <question>` sends a native, non-anonymous 👍/👎 poll instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use async_trait::async_trait;
use storage::{Poll, PollVote, StorageError, Store, UserRecord, UserTopic, Vote};
use tokio::sync::{Mutex, OwnedMutexGuard};
use topicbot_core::markdown::mention;
use topicbot_core::{
    CallbackQuery, EditMessageParams, Handler, HandlerError, HandlerResponse, InlineButton,
    InlineKeyboard, Message, MessagingClient, ParseMode, PollAnswer, Result, SendMessageParams,
    SendPollParams, Update,
};
use tracing::{debug, info};

use crate::validation::validate_topic;

/// A user's vote on one poll after a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    NoVote,
    Voted(Vote),
}

/// Applies one button press: pressing the current vote retracts it, anything else
/// records the new vote. An up vote also subscribes the voter to the poll's topic.
///
/// Callers serialize presses per poll (see [`PollLocks`]).
pub async fn cast_vote(
    store: &dyn Store,
    poll: &Poll,
    user_id: i64,
    vote: Vote,
) -> std::result::Result<VoteState, StorageError> {
    let existing = store.find_poll_vote(&poll.id, user_id).await?;

    let state = match existing {
        Some(previous) if previous.vote == vote => {
            store.delete_poll_vote(&poll.id, user_id).await?;
            VoteState::NoVote
        }
        _ => {
            store
                .save_poll_vote(&PollVote::new(poll.id.clone(), user_id, vote))
                .await?;
            VoteState::Voted(vote)
        }
    };

    if vote == Vote::Up {
        store
            .save_user_topic(&UserTopic::new(poll.chat_id, user_id, poll.topic.clone()))
            .await?;
    }
    Ok(state)
}

/// Subscribers split by their vote, each bucket in subscription order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub up: Vec<UserRecord>,
    pub down: Vec<UserRecord>,
    pub remaining: Vec<UserRecord>,
}

impl Tally {
    pub fn compute(subscribers: Vec<UserRecord>, votes: &[PollVote]) -> Self {
        let by_user: HashMap<i64, Vote> = votes.iter().map(|v| (v.user_id, v.vote)).collect();

        let mut tally = Tally::default();
        for user in subscribers {
            match by_user.get(&user.id) {
                Some(Vote::Up) => tally.up.push(user),
                Some(Vote::Down) => tally.down.push(user),
                None => tally.remaining.push(user),
            }
        }
        tally
    }

    /// MarkdownV2 text: one block per bucket with its count and a mention per member.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for (title, users) in [
            ("yes", &self.up),
            ("no", &self.down),
            ("remaining", &self.remaining),
        ] {
            text.push_str(&format!("*{} \\({} votes\\)*\n", title, users.len()));
            for user in users {
                text.push_str(&mention(user.display_name(), user.id));
                text.push('\n');
            }
            text.push('\n');
        }
        text.trim_end().to_string()
    }

    pub fn keyboard(&self) -> InlineKeyboard {
        InlineKeyboard::single_row(vec![
            InlineButton::new(format!("👍 {}", self.up.len()), Vote::Up.callback_data()),
            InlineButton::new(format!("👎 {}", self.down.len()), Vote::Down.callback_data()),
        ])
    }
}

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// One async mutex per poll id. An entry lives only while someone holds or waits for it.
#[derive(Default)]
pub struct PollLocks {
    locks: Arc<StdMutex<LockMap>>,
}

impl PollLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, poll_id: &str) -> PollGuard {
        let lock = lock_map(&self.locks)
            .entry(poll_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        PollGuard {
            poll_id: poll_id.to_string(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Number of polls with a live lock entry.
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_map(locks: &StdMutex<LockMap>) -> StdMutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds one poll's lock; on drop, removes the entry when no other task references it.
pub struct PollGuard {
    poll_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        let mut locks = lock_map(&self.locks);
        // Release first: the owned guard keeps its own reference to the mutex.
        self.guard.take();
        let unused = locks
            .get(&self.poll_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.poll_id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    /// `/bora <topic>`
    Call,
    /// A plain `#topic` message; silent on anything but a successful call.
    Hashtag,
    /// A 👍/👎 button press.
    Vote,
    /// `/pollo <question>`
    Native,
    /// An answer to a native poll.
    Answer,
}

pub struct PollHandler {
    command: PollCommand,
    store: Arc<dyn Store>,
    locks: Arc<PollLocks>,
}

impl PollHandler {
    pub fn new(command: PollCommand, store: Arc<dyn Store>, locks: Arc<PollLocks>) -> Self {
        Self {
            command,
            store,
            locks,
        }
    }

    /// Sends the initial tally (everyone remaining) and records the poll.
    /// With `quiet`, a topic without subscribers gets no answer.
    async fn call_subscribers(
        &self,
        bot: &dyn MessagingClient,
        message: &Message,
        topic: &str,
        quiet: bool,
    ) -> Result<HandlerResponse> {
        let chat_id = message.chat.id;
        let users = self.store.find_users_by_topic(chat_id, topic).await?;
        if users.is_empty() {
            if quiet {
                return Ok(HandlerResponse::Done);
            }
            return Ok(HandlerResponse::reply("Nobody is subscribed to this topic."));
        }

        let subscribers = users.len();
        let tally = Tally::compute(users, &[]);
        let sent = bot
            .send_message(
                SendMessageParams::new(chat_id, tally.render())
                    .reply_to(message.id)
                    .parse_mode(ParseMode::MarkdownV2)
                    .reply_markup(tally.keyboard()),
            )
            .await?;

        self.store
            .save_poll(&Poll::new(sent.chat_id, sent.message_id, topic))
            .await?;
        info!(chat_id, topic, subscribers, message_id = sent.message_id, "Subscribers called");
        Ok(HandlerResponse::Done)
    }

    async fn call(&self, bot: &dyn MessagingClient, message: &Message) -> Result<HandlerResponse> {
        match validate_topic(message.command_argument().unwrap_or("")) {
            Ok(topic) => self.call_subscribers(bot, message, topic, false).await,
            Err(e) => Ok(HandlerResponse::reply(e.to_string())),
        }
    }

    async fn hashtag(&self, bot: &dyn MessagingClient, message: &Message) -> Result<HandlerResponse> {
        let text = message.text.trim();
        if !text.starts_with('#') {
            return Ok(HandlerResponse::Done);
        }
        match validate_topic(text) {
            Ok(topic) => self.call_subscribers(bot, message, topic, true).await,
            Err(_) => Ok(HandlerResponse::Done),
        }
    }

    async fn vote(&self, bot: &dyn MessagingClient, query: &CallbackQuery) -> Result<HandlerResponse> {
        let origin = query
            .message
            .ok_or(HandlerError::MissingPayload("callback message"))?;
        let data = query
            .data
            .as_deref()
            .ok_or(HandlerError::MissingPayload("callback data"))?;
        let vote: Vote = data.parse().map_err(HandlerError::InvalidVote)?;

        let poll = self
            .store
            .find_poll_by_message_id(origin.chat_id, origin.message_id)
            .await?
            .ok_or(HandlerError::PollNotFound {
                chat_id: origin.chat_id,
                message_id: origin.message_id,
            })?;

        let voter = &query.from;
        let _guard = self.locks.lock(&poll.id).await;

        self.store.save_user(&UserRecord::from(voter)).await?;
        let state = cast_vote(self.store.as_ref(), &poll, voter.id, vote).await?;
        debug!(poll_id = %poll.id, user_id = voter.id, state = ?state, "Vote applied");

        let subscribers = self
            .store
            .find_users_by_topic(poll.chat_id, &poll.topic)
            .await?;
        if !subscribers.iter().any(|u| u.id == voter.id) {
            debug!(poll_id = %poll.id, user_id = voter.id, "Voter not subscribed, tally unchanged");
            return Ok(HandlerResponse::Done);
        }

        let votes = self.store.find_poll_votes(&poll.id).await?;
        let tally = Tally::compute(subscribers, &votes);
        bot.edit_message_text(
            EditMessageParams::new(poll.chat_id, poll.result_message_id, tally.render())
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(tally.keyboard()),
        )
        .await?;

        info!(
            poll_id = %poll.id,
            up = tally.up.len(),
            down = tally.down.len(),
            remaining = tally.remaining.len(),
            "Tally updated"
        );
        Ok(HandlerResponse::Done)
    }

    async fn native(&self, bot: &dyn MessagingClient, message: &Message) -> Result<HandlerResponse> {
        let question = message.command_argument().map(str::trim).unwrap_or("");
        if question.is_empty() {
            return Ok(HandlerResponse::reply("Which question? Use /pollo <question>."));
        }

        let sent = bot
            .send_poll(SendPollParams::new(
                message.chat.id,
                question,
                vec![NATIVE_UP.to_string(), NATIVE_DOWN.to_string()],
            ))
            .await?;
        info!(chat_id = sent.chat_id, message_id = sent.message_id, "Native poll sent");
        Ok(HandlerResponse::Done)
    }

    /// Native poll answers only refresh the voter's stored names.
    async fn answer(&self, answer: &PollAnswer) -> Result<HandlerResponse> {
        if let Some(voter) = &answer.user {
            self.store.save_user(&UserRecord::from(voter)).await?;
        }
        debug!(
            poll_id = %answer.poll_id,
            user_id = answer.user.as_ref().map(|u| u.id),
            options = ?answer.option_ids,
            "Native poll answered"
        );
        Ok(HandlerResponse::Done)
    }
}

const NATIVE_UP: &str = "👍";
const NATIVE_DOWN: &str = "👎";

#[async_trait]
impl Handler for PollHandler {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        match self.command {
            PollCommand::Call | PollCommand::Hashtag => {
                let message = update
                    .message()
                    .ok_or(HandlerError::MissingPayload("message"))?;
                if self.command == PollCommand::Call {
                    self.call(bot, message).await
                } else {
                    self.hashtag(bot, message).await
                }
            }
            PollCommand::Vote => {
                let query = update
                    .callback_query()
                    .ok_or(HandlerError::MissingPayload("callback query"))?;
                self.vote(bot, query).await
            }
            PollCommand::Native => {
                let message = update
                    .message()
                    .ok_or(HandlerError::MissingPayload("message"))?;
                self.native(bot, message).await
            }
            PollCommand::Answer => {
                let answer = update
                    .poll_answer()
                    .ok_or(HandlerError::MissingPayload("poll answer"))?;
                self.answer(answer).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> UserRecord {
        UserRecord {
            id,
            first_name: name.to_string(),
            username: String::new(),
        }
    }

    /// **Test: Subscribers land in the bucket of their vote, in subscription order.**
    ///
    /// **Setup:** Subscribers A, B, C; A voted up, B voted down.
    /// **Expected:** 1/1/1 with A up, B down, C remaining; buttons show the counts.
    #[test]
    fn test_tally_buckets() {
        let votes = vec![
            PollVote::new("p", 1, Vote::Up),
            PollVote::new("p", 2, Vote::Down),
            PollVote::new("p", 99, Vote::Up),
        ];
        let tally = Tally::compute(vec![user(1, "A"), user(2, "B"), user(3, "C")], &votes);

        assert_eq!(tally.up, vec![user(1, "A")]);
        assert_eq!(tally.down, vec![user(2, "B")]);
        assert_eq!(tally.remaining, vec![user(3, "C")]);

        let keyboard = tally.keyboard();
        assert_eq!(keyboard.rows.len(), 1);
        assert_eq!(keyboard.rows[0][0], InlineButton::new("👍 1", "0"));
        assert_eq!(keyboard.rows[0][1], InlineButton::new("👎 1", "1"));
    }

    #[test]
    fn test_tally_render() {
        let tally = Tally::compute(
            vec![user(1, "A"), user(2, "B_b"), user(3, "C")],
            &[PollVote::new("p", 1, Vote::Up), PollVote::new("p", 2, Vote::Down)],
        );

        assert_eq!(
            tally.render(),
            "*yes \\(1 votes\\)*\n[A](tg://user?id=1)\n\n\
             *no \\(1 votes\\)*\n[B\\_b](tg://user?id=2)\n\n\
             *remaining \\(1 votes\\)*\n[C](tg://user?id=3)"
        );
    }

    #[test]
    fn test_empty_buckets_render_counts() {
        let tally = Tally::compute(vec![user(1, "A")], &[]);
        assert_eq!(
            tally.render(),
            "*yes \\(0 votes\\)*\n\n*no \\(0 votes\\)*\n\n*remaining \\(1 votes\\)*\n[A](tg://user?id=1)"
        );
    }

    #[tokio::test]
    async fn test_poll_locks_serialize_same_poll() {
        let locks = Arc::new(PollLocks::new());
        let guard = locks.lock("a").await;

        let other = locks.lock("b").await;
        drop(other);

        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
    }

    /// **Test: Lock entries are dropped once their guards are released.**
    ///
    /// **Setup:** 1000 distinct poll ids locked and released in a row, then one id held
    /// while a second task waits on it.
    /// **Expected:** The map is empty after each release; the contended entry survives the
    /// first release and goes away after the waiter's.
    #[tokio::test]
    async fn test_poll_locks_release_entries() {
        let locks = Arc::new(PollLocks::new());
        for id in 0..1000 {
            let _guard = locks.lock(&format!("poll-{}", id)).await;
        }
        assert!(locks.is_empty());

        let guard = locks.lock("a").await;
        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(locks.len(), 1);

        drop(guard);
        waiting.await.unwrap();
        assert!(locks.is_empty());
    }
}
