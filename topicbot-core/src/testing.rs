//! Test support: a recording [`MessagingClient`] and update builders.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for the
//! dev-dependencies of the other workspace crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::bot::MessagingClient;
use crate::error::{BotError, Result};
use crate::types::{
    CallbackQuery, Chat, ChatKind, ChatMember, ChatMemberStatus, EditMessageParams,
    InlineQuery, InlineQueryArticle, Message, MessageRef, PollAnswer, SendMessageParams,
    SendPollParams, SentMessage, Update, UpdateKind, User,
};

/// Records every outbound call. `send_message` and `send_poll` share increasing message ids
/// starting at 1000.
pub struct MockClient {
    username: String,
    next_message_id: AtomicI32,
    sent: Mutex<Vec<SendMessageParams>>,
    edits: Mutex<Vec<EditMessageParams>>,
    polls: Mutex<Vec<SendPollParams>>,
    inline_answers: Mutex<Vec<(String, Vec<InlineQueryArticle>)>>,
    statuses: Mutex<HashMap<(i64, i64), ChatMemberStatus>>,
    fail_sends: bool,
}

impl MockClient {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            next_message_id: AtomicI32::new(1000),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            inline_answers: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            fail_sends: false,
        }
    }

    /// A client whose `send_message` always fails.
    pub fn failing(username: &str) -> Self {
        Self {
            fail_sends: true,
            ..Self::new(username)
        }
    }

    /// Sets the status `get_chat_member` reports; unknown members are `Member`.
    pub fn set_status(&self, chat_id: i64, user_id: i64, status: ChatMemberStatus) {
        lock(&self.statuses).insert((chat_id, user_id), status);
    }

    pub fn sent(&self) -> Vec<SendMessageParams> {
        lock(&self.sent).clone()
    }

    pub fn edits(&self) -> Vec<EditMessageParams> {
        lock(&self.edits).clone()
    }

    pub fn polls(&self) -> Vec<SendPollParams> {
        lock(&self.polls).clone()
    }

    pub fn inline_answers(&self) -> Vec<(String, Vec<InlineQueryArticle>)> {
        lock(&self.inline_answers).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl MessagingClient for MockClient {
    fn username(&self) -> &str {
        &self.username
    }

    async fn send_message(&self, params: SendMessageParams) -> Result<SentMessage> {
        if self.fail_sends {
            return Err(BotError::Messaging("send failed".to_string()));
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        let chat_id = params.chat_id;
        lock(&self.sent).push(params);
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn edit_message_text(&self, params: EditMessageParams) -> Result<()> {
        lock(&self.edits).push(params);
        Ok(())
    }

    async fn send_poll(&self, params: SendPollParams) -> Result<SentMessage> {
        if self.fail_sends {
            return Err(BotError::Messaging("send failed".to_string()));
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        let chat_id = params.chat_id;
        lock(&self.polls).push(params);
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember> {
        let status = lock(&self.statuses)
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(ChatMemberStatus::Member);
        Ok(ChatMember { user_id, status })
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: Vec<InlineQueryArticle>,
    ) -> Result<()> {
        lock(&self.inline_answers).push((inline_query_id.to_string(), results));
        Ok(())
    }
}

pub fn user(id: i64, first_name: &str) -> User {
    User {
        id,
        is_bot: false,
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
    }
}

pub fn group(id: i64) -> Chat {
    Chat {
        id,
        kind: ChatKind::Supergroup,
        title: Some("Test group".to_string()),
    }
}

pub fn message(id: i32, chat: Chat, from: User, text: &str) -> Message {
    Message {
        id,
        chat,
        from: Some(from),
        text: text.to_string(),
        date: Utc::now(),
        reply_to_message: None,
        is_forwarded: false,
    }
}

/// A text message from `user_id` in group `chat_id`; the message id equals the update id.
pub fn text_update(update_id: i64, chat_id: i64, user_id: i64, text: &str) -> Update {
    Update::new(
        update_id,
        UpdateKind::Message(message(
            update_id as i32,
            group(chat_id),
            user(user_id, &format!("user{}", user_id)),
            text,
        )),
    )
}

pub fn message_update(update_id: i64, message: Message) -> Update {
    Update::new(update_id, UpdateKind::Message(message))
}

/// A button press on message `message_id` in `chat_id`.
pub fn callback_update(
    update_id: i64,
    from: User,
    chat_id: i64,
    message_id: i32,
    data: &str,
) -> Update {
    Update::new(
        update_id,
        UpdateKind::CallbackQuery(CallbackQuery {
            id: format!("cb{}", update_id),
            from,
            message: Some(MessageRef {
                chat_id,
                message_id,
            }),
            data: Some(data.to_string()),
        }),
    )
}

pub fn inline_update(update_id: i64, user_id: i64, query: &str) -> Update {
    Update::new(
        update_id,
        UpdateKind::InlineQuery(InlineQuery {
            id: format!("iq{}", update_id),
            from: user(user_id, "inline"),
            query: query.to_string(),
        }),
    )
}

pub fn poll_answer_update(update_id: i64, poll_id: &str, voter: User, option_ids: Vec<u32>) -> Update {
    Update::new(
        update_id,
        UpdateKind::PollAnswer(PollAnswer {
            poll_id: poll_id.to_string(),
            user: Some(voter),
            option_ids,
        }),
    )
}
