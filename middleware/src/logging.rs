//! Update logging middleware.

use std::sync::Arc;

use async_trait::async_trait;
use topicbot_core::{Handler, HandlerResponse, MessagingClient, Middleware, Result, Update};
use tracing::{error, info, instrument};

/// Logs every dispatched update in front of the handler, and the response after it.
pub struct UpdateLogging;

impl Middleware for UpdateLogging {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(Logged { next })
    }
}

struct Logged {
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Logged {
    #[instrument(skip(self, bot, update), fields(update_id = update.id))]
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let chat_id = update.origin().map(|origin| origin.chat_id);
        info!(
            update_id = update.id,
            kind = update.kind_name(),
            user_id = ?update.sender().map(|u| u.id),
            chat_id = ?chat_id,
            text = %update.text(),
            "Received update"
        );

        let result = self.next.handle(bot, update).await;

        match &result {
            Ok(HandlerResponse::Done) => {
                info!(update_id = update.id, response_type = "Done", "Processed update")
            }
            Ok(HandlerResponse::Reply(reply)) => info!(
                update_id = update.id,
                response_type = "Reply",
                reply_len = reply.text.len(),
                "Processed update"
            ),
            Err(e) => error!(update_id = update.id, error = %e, "Update failed"),
        }
        result
    }
}
