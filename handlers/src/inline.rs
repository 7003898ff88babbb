//! Inline mode: typing `@bot <topic>` offers a ready-made `#topic` message, which calls
//! the topic's subscribers when sent.

use async_trait::async_trait;
use topicbot_core::{
    Handler, HandlerError, HandlerResponse, InlineQueryArticle, MessagingClient, Result, Update,
};
use tracing::debug;

use crate::validation::validate_topic;

pub struct InlineTopicHandler;

/// The `#topic` form of an inline query, or `None` when it is not a valid topic.
fn hashtag_for(query: &str) -> Option<String> {
    let query = query.trim();
    let topic = if query.starts_with('#') {
        query.to_string()
    } else {
        format!("#{}", query)
    };
    validate_topic(&topic).ok().map(str::to_string)
}

#[async_trait]
impl Handler for InlineTopicHandler {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let query = update
            .inline_query()
            .ok_or(HandlerError::MissingPayload("inline query"))?;

        let results = match hashtag_for(&query.query) {
            Some(topic) if topic.len() > 1 => vec![InlineQueryArticle {
                id: topic.clone(),
                title: format!("Call {}", topic),
                message_text: topic,
            }],
            _ => Vec::new(),
        };
        debug!(inline_query_id = %query.id, results = results.len(), "Answering inline query");

        bot.answer_inline_query(&query.id, results).await?;
        Ok(HandlerResponse::Done)
    }
}
