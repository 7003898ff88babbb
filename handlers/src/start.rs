//! `/start`: registers the chat so the other commands answer in it.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{ChatRecord, Store};
use topicbot_core::{Handler, HandlerError, HandlerResponse, MessagingClient, Result, Update};
use tracing::info;

const GREETING: &str = "Let's go! Subscribe to a topic with /suba <topic>.";

pub struct StartHandler {
    store: Arc<dyn Store>,
}

impl StartHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, _bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let message = update
            .message()
            .ok_or(HandlerError::MissingPayload("message"))?;

        self.store
            .save_chat(&ChatRecord::new(message.chat.id, message.chat.name()))
            .await?;
        info!(chat_id = message.chat.id, "Chat started");

        Ok(HandlerResponse::reply(GREETING))
    }
}
