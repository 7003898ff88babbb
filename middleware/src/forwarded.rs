//! Drops commands that were forwarded from elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use topicbot_core::{Handler, HandlerResponse, MessagingClient, Middleware, Result, Update};
use tracing::debug;

/// Forwarded messages are ignored; guard it with `any_command()` so plain forwards still route.
pub struct IgnoreForwardedCommand;

impl Middleware for IgnoreForwardedCommand {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(SkipForwarded { next })
    }
}

struct SkipForwarded {
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for SkipForwarded {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        if update.message().is_some_and(|m| m.is_forwarded) {
            debug!(update_id = update.id, "Ignoring forwarded command");
            return Ok(HandlerResponse::Done);
        }
        self.next.handle(bot, update).await
    }
}
