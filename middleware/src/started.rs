//! Ignores chats that never ran `/start`.

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::criteria::{command, Criteria};
use storage::Store;
use topicbot_core::{Handler, HandlerResponse, MessagingClient, Middleware, Result, Update};
use tracing::debug;

/// `/start` always passes; any other message from a chat without a stored record is
/// dropped before the handler runs.
pub struct EnsureStarted {
    store: Arc<dyn Store>,
}

impl EnsureStarted {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Middleware for EnsureStarted {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(StartedOnly {
            store: self.store.clone(),
            start: command("start"),
            next,
        })
    }
}

struct StartedOnly {
    store: Arc<dyn Store>,
    start: Criteria,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for StartedOnly {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let Some(message) = update.message() else {
            return self.next.handle(bot, update).await;
        };
        if self.start.matches(bot, update) {
            return self.next.handle(bot, update).await;
        }

        if self.store.find_chat(message.chat.id).await?.is_none() {
            debug!(chat_id = message.chat.id, "Chat not started, ignoring message");
            return Ok(HandlerResponse::Done);
        }
        self.next.handle(bot, update).await
    }
}
