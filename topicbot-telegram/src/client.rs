//! Wraps teloxide::Bot and implements [`MessagingClient`]. Production code talks to the Bot API;
//! tests substitute a recording mock or point the bot at a local HTTP server.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberStatus as TgStatus, InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryId,
    InlineQueryResult, InlineQueryResultArticle, InputMessageContent, InputMessageContentText,
    InputPollOption, MessageId, ParseMode as TgParseMode, ReplyParameters,
};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info, instrument, warn};

use topicbot_core::{
    BotError, ChatMember, ChatMemberStatus, EditMessageParams, InlineKeyboard, InlineQueryArticle,
    MessagingClient, ParseMode, Result, SendMessageParams, SendPollParams, SentMessage,
};

/// Builds a teloxide Bot whose HTTP client outlives one long-poll round.
/// `api_url` points the bot at a local Bot API server (or a test server).
pub fn create_bot(
    token: &str,
    api_url: Option<reqwest::Url>,
    request_timeout: Duration,
) -> anyhow::Result<Bot> {
    let client = reqwest::Client::builder().timeout(request_timeout).build()?;
    let bot = Bot::with_client(token, client);
    Ok(match api_url {
        Some(url) => {
            info!(api_url = %url, "Using custom Bot API URL");
            bot.set_api_url(url)
        }
        None => bot,
    })
}

/// Thin wrapper around teloxide::Bot that implements the core messaging trait.
pub struct TelegramClient {
    bot: Bot,
    username: String,
}

impl TelegramClient {
    /// Calls `getMe` once to learn the bot's username, which command matching needs.
    #[instrument(skip(bot))]
    pub async fn connect(bot: Bot) -> Result<Self> {
        let me = bot.get_me().await.map_err(messaging_error)?;
        let username = me.user.username.clone().unwrap_or_default();
        info!(username = %username, bot_id = me.user.id.0, "Bot identity fetched");
        Ok(Self { bot, username })
    }
}

fn messaging_error(e: RequestError) -> BotError {
    BotError::Messaging(e.to_string())
}

fn to_tg_keyboard(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.text, button.callback_data))
            .collect::<Vec<_>>()
    }))
}

pub(crate) fn to_core_status(status: TgStatus) -> ChatMemberStatus {
    match status {
        TgStatus::Owner => ChatMemberStatus::Creator,
        TgStatus::Administrator => ChatMemberStatus::Administrator,
        TgStatus::Restricted => ChatMemberStatus::Restricted,
        TgStatus::Left => ChatMemberStatus::Left,
        TgStatus::Banned => ChatMemberStatus::Banned,
        _ => ChatMemberStatus::Member,
    }
}

#[async_trait]
impl MessagingClient for TelegramClient {
    fn username(&self) -> &str {
        &self.username
    }

    async fn send_message(&self, params: SendMessageParams) -> Result<SentMessage> {
        let mut request = self.bot.send_message(ChatId(params.chat_id), params.text);
        if let Some(message_id) = params.reply_to_message_id {
            let mut reply = ReplyParameters::new(MessageId(message_id));
            if params.allow_sending_without_reply {
                reply = reply.allow_sending_without_reply();
            }
            request = request.reply_parameters(reply);
        }
        if params.parse_mode == ParseMode::MarkdownV2 {
            request = request.parse_mode(TgParseMode::MarkdownV2);
        }
        if let Some(keyboard) = params.reply_markup {
            request = request.reply_markup(to_tg_keyboard(keyboard));
        }

        let sent = request.await.map_err(messaging_error)?;
        debug!(chat_id = sent.chat.id.0, message_id = sent.id.0, "step: message sent");
        Ok(SentMessage {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn edit_message_text(&self, params: EditMessageParams) -> Result<()> {
        let mut request = self.bot.edit_message_text(
            ChatId(params.chat_id),
            MessageId(params.message_id),
            params.text,
        );
        if params.parse_mode == ParseMode::MarkdownV2 {
            request = request.parse_mode(TgParseMode::MarkdownV2);
        }
        if let Some(keyboard) = params.reply_markup {
            request = request.reply_markup(to_tg_keyboard(keyboard));
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                warn!(
                    chat_id = params.chat_id,
                    message_id = params.message_id,
                    "Edit skipped: message not modified"
                );
                Ok(())
            }
            Err(e) => Err(messaging_error(e)),
        }
    }

    async fn send_poll(&self, params: SendPollParams) -> Result<SentMessage> {
        let options = params.options.into_iter().map(InputPollOption::new);
        let sent = self
            .bot
            .send_poll(ChatId(params.chat_id), params.question, options)
            .is_anonymous(params.is_anonymous)
            .await
            .map_err(messaging_error)?;
        debug!(chat_id = sent.chat.id.0, message_id = sent.id.0, "step: poll sent");
        Ok(SentMessage {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id as u64))
            .await
            .map_err(messaging_error)?;
        Ok(ChatMember {
            user_id,
            status: to_core_status(member.status()),
        })
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: Vec<InlineQueryArticle>,
    ) -> Result<()> {
        let results = results.into_iter().map(|article| {
            InlineQueryResult::Article(InlineQueryResultArticle::new(
                article.id,
                article.title,
                InputMessageContent::Text(InputMessageContentText::new(article.message_text)),
            ))
        });
        self.bot
            .answer_inline_query(InlineQueryId(inline_query_id.to_string()), results)
            .await
            .map_err(messaging_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicbot_core::InlineButton;

    #[test]
    fn test_owner_and_admin_map_to_admin_statuses() {
        assert_eq!(to_core_status(TgStatus::Owner), ChatMemberStatus::Creator);
        assert_eq!(
            to_core_status(TgStatus::Administrator),
            ChatMemberStatus::Administrator
        );
        assert_eq!(to_core_status(TgStatus::Member), ChatMemberStatus::Member);
        assert_eq!(to_core_status(TgStatus::Left), ChatMemberStatus::Left);
    }

    #[test]
    fn test_keyboard_keeps_rows_and_callback_data() {
        let markup = to_tg_keyboard(InlineKeyboard::single_row(vec![
            InlineButton::new("yes", "0"),
            InlineButton::new("no", "1"),
        ]));

        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[0][1].text, "no");
    }
}
