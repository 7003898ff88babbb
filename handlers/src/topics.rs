//! Subscription commands: subscribe, unsubscribe and the listings.

use std::sync::Arc;

use async_trait::async_trait;
use middleware::AdminPolicy;
use storage::{ChatFeature, Store, UserRecord, UserTopic};
use topicbot_core::markdown::escape_markdown_v2;
use topicbot_core::{
    Handler, HandlerError, HandlerResponse, Message, MessagingClient, Reply, Result, Update, User,
};
use tracing::{info, warn};

use crate::validation::validate_topic;

/// Topics accepted by one `/suba`, one per line.
pub const MAX_TOPICS_PER_SUBSCRIBE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicCommand {
    /// `/suba <topic>[\n<topic>…]`, optionally replying to the user to subscribe.
    Subscribe,
    /// `/desca <topic>`
    Unsubscribe,
    /// `/quem <topic>`
    ListSubscribers,
    /// `/lista`
    ListUserTopics,
    /// `/listudo`
    ListChatTopics,
}

pub struct TopicHandler {
    command: TopicCommand,
    store: Arc<dyn Store>,
    admins: AdminPolicy,
}

impl TopicHandler {
    pub fn new(command: TopicCommand, store: Arc<dyn Store>, admins: AdminPolicy) -> Self {
        Self {
            command,
            store,
            admins,
        }
    }

    async fn subscribe(&self, bot: &dyn MessagingClient, message: &Message) -> Result<HandlerResponse> {
        let sender = sender(message)?;
        let topics: Vec<&str> = message
            .command_argument()
            .map(|arg| arg.split('\n').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default();

        if topics.is_empty() {
            return Ok(HandlerResponse::reply("Which topic(s)? Use /suba <topic>."));
        }
        if topics.len() > MAX_TOPICS_PER_SUBSCRIBE {
            return Ok(HandlerResponse::reply(format!(
                "At most {} topics at a time.",
                MAX_TOPICS_PER_SUBSCRIBE
            )));
        }
        for topic in &topics {
            if let Err(e) = validate_topic(topic) {
                return Ok(invalid_topic_reply(e));
            }
        }

        let target = match message.reply_to_message.as_ref().and_then(|m| m.from.as_ref()) {
            Some(replied) if replied.is_bot => {
                return Ok(HandlerResponse::reply("Bots can't be subscribed."));
            }
            Some(replied) => replied,
            None => sender,
        };
        let user = UserRecord::from(target);

        let chat_id = message.chat.id;
        let mut may_create = None;
        for topic in &topics {
            if self.store.exists_chat_topic(chat_id, topic).await? {
                continue;
            }
            let allowed = match may_create {
                Some(allowed) => allowed,
                None => {
                    let allowed = self.may_create_topics(bot, message, sender).await?;
                    may_create = Some(allowed);
                    allowed
                }
            };
            if !allowed {
                return Ok(HandlerResponse::reply(
                    "You can only subscribe to existing topics.",
                ));
            }
        }

        self.store.save_user(&user).await?;
        for topic in &topics {
            self.store
                .save_user_topic(&UserTopic::new(chat_id, user.id, *topic))
                .await?;
        }
        info!(chat_id, user_id = user.id, topics = ?topics, "Subscribed");

        let mut text = format!("Subscriptions added for {}:\n", user.display_name());
        for topic in &topics {
            text.push_str(&format!("- {}\n", topic));
        }
        Ok(HandlerResponse::reply(text))
    }

    async fn may_create_topics(
        &self,
        bot: &dyn MessagingClient,
        message: &Message,
        sender: &User,
    ) -> Result<bool> {
        if self
            .store
            .chat_enables(message.chat.id, ChatFeature::CreateTopics)
            .await?
        {
            return Ok(true);
        }
        match self.admins.is_admin(bot, &message.chat, sender.id).await {
            Ok(is_admin) => Ok(is_admin),
            Err(e) => {
                warn!(chat_id = message.chat.id, user_id = sender.id, error = %e, "Admin check failed");
                Ok(false)
            }
        }
    }

    async fn unsubscribe(&self, message: &Message) -> Result<HandlerResponse> {
        let sender = sender(message)?;
        let topic = match validate_topic(message.command_argument().unwrap_or("")) {
            Ok(topic) => topic,
            Err(e) => return Ok(invalid_topic_reply(e)),
        };

        let removed = self
            .store
            .delete_user_topic(&UserTopic::new(message.chat.id, sender.id, topic))
            .await?;

        let name = match self.store.find_user(sender.id).await? {
            Some(user) => user.display_name().to_string(),
            None => sender.display_name().to_string(),
        };
        if removed == 0 {
            return Ok(HandlerResponse::reply(format!(
                "{} is not subscribed to this topic.",
                name
            )));
        }
        info!(chat_id = message.chat.id, user_id = sender.id, topic, "Unsubscribed");
        Ok(HandlerResponse::reply(format!("Subscription removed for {}.", name)))
    }

    async fn list_subscribers(&self, message: &Message) -> Result<HandlerResponse> {
        let topic = match validate_topic(message.command_argument().unwrap_or("")) {
            Ok(topic) => topic,
            Err(e) => return Ok(invalid_topic_reply(e)),
        };

        let users = self.store.find_users_by_topic(message.chat.id, topic).await?;
        if users.is_empty() {
            return Ok(HandlerResponse::reply("Nobody is subscribed to this topic."));
        }

        let mut text = format!("*subscribers \\({}\\)*\n", users.len());
        for user in &users {
            text.push_str(&format!("\\- {}\n", escape_markdown_v2(user.display_name())));
        }
        Ok(Reply::markdown(text).into())
    }

    async fn list_user_topics(&self, message: &Message) -> Result<HandlerResponse> {
        let sender = sender(message)?;
        let topics = self
            .store
            .find_user_chat_topics(message.chat.id, sender.id)
            .await?;
        if topics.is_empty() {
            return Ok(HandlerResponse::reply("You are not subscribed to any topic."));
        }

        let mut text = String::from("Your topics:\n");
        for topic in &topics {
            text.push_str(&format!("({:02})  {}\n", topic.subscribers, topic.topic));
        }
        Ok(HandlerResponse::reply(text))
    }

    async fn list_chat_topics(&self, message: &Message) -> Result<HandlerResponse> {
        let topics = self.store.find_chat_topics(message.chat.id).await?;
        if topics.is_empty() {
            return Ok(HandlerResponse::reply("No topics in this chat yet."));
        }

        let mut text = String::from("Topics:\n");
        for topic in &topics {
            text.push_str(&format!("- ({:02})  {}\n", topic.subscribers, topic.topic));
        }
        Ok(HandlerResponse::reply(text))
    }
}

fn sender(message: &Message) -> std::result::Result<&User, HandlerError> {
    message.from.as_ref().ok_or(HandlerError::MissingPayload("sender"))
}

fn invalid_topic_reply(err: HandlerError) -> HandlerResponse {
    HandlerResponse::reply(err.to_string())
}

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let message = update
            .message()
            .ok_or(HandlerError::MissingPayload("message"))?;

        match self.command {
            TopicCommand::Subscribe => self.subscribe(bot, message).await,
            TopicCommand::Unsubscribe => self.unsubscribe(message).await,
            TopicCommand::ListSubscribers => self.list_subscribers(message).await,
            TopicCommand::ListUserTopics => self.list_user_topics(message).await,
            TopicCommand::ListChatTopics => self.list_chat_topics(message).await,
        }
    }
}
