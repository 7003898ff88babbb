//! `/enable <feature>` and `/disable <feature>`. Registered behind `RequireAdmin`.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{ChatFeature, Store};
use topicbot_core::{Handler, HandlerError, HandlerResponse, MessagingClient, Result, Update};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAction {
    Enable,
    Disable,
}

pub struct FeatureHandler {
    action: FeatureAction,
    store: Arc<dyn Store>,
}

impl FeatureHandler {
    pub fn new(action: FeatureAction, store: Arc<dyn Store>) -> Self {
        Self { action, store }
    }
}

fn available() -> String {
    ChatFeature::ALL
        .iter()
        .map(ChatFeature::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Handler for FeatureHandler {
    async fn handle(&self, _bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let message = update
            .message()
            .ok_or(HandlerError::MissingPayload("message"))?;

        let feature = match message.command_argument().map(str::parse::<ChatFeature>) {
            Some(Ok(feature)) => feature,
            Some(Err(e)) => {
                return Ok(HandlerResponse::reply(format!(
                    "{}. Available: {}",
                    e,
                    available()
                )));
            }
            None => {
                return Ok(HandlerResponse::reply(format!(
                    "Which feature? Available: {}",
                    available()
                )));
            }
        };

        let chat_id = message.chat.id;
        match self.action {
            FeatureAction::Enable => {
                self.store.enable_feature(chat_id, feature).await?;
                Ok(HandlerResponse::reply(format!("Enabled {}.", feature)))
            }
            FeatureAction::Disable => {
                self.store.disable_feature(chat_id, feature).await?;
                Ok(HandlerResponse::reply(format!("Disabled {}.", feature)))
            }
        }
    }
}
