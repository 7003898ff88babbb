//! Messaging platform abstraction.
//!
//! [`MessagingClient`] is transport-agnostic; the Telegram implementation lives in
//! `topicbot-telegram`, tests substitute recording mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ChatMember, EditMessageParams, InlineQueryArticle, SendMessageParams, SendPollParams,
    SentMessage,
};

/// Outbound calls handlers and the dispatcher make against the messaging platform.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// The bot's own username, without the leading `@`.
    fn username(&self) -> &str;

    /// Sends a text message and returns where it landed.
    async fn send_message(&self, params: SendMessageParams) -> Result<SentMessage>;

    /// Replaces the text (and keyboard) of a message the bot sent earlier.
    async fn edit_message_text(&self, params: EditMessageParams) -> Result<()>;

    async fn send_poll(&self, params: SendPollParams) -> Result<SentMessage>;

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember>;

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: Vec<InlineQueryArticle>,
    ) -> Result<()>;
}
