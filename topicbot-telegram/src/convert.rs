//! Conversion from teloxide update types to core types.
//! Depends only on teloxide and topicbot_core type definitions.

use teloxide::types::{
    Chat as TgChat, Message as TgMessage, PollAnswer as TgPollAnswer, Update as TgUpdate,
    UpdateKind as TgUpdateKind, User as TgUser,
};
use tracing::warn;

use topicbot_core::{
    CallbackQuery, Chat, ChatKind, InlineQuery, Message, MessageRef, PollAnswer, Update,
    UpdateKind, User,
};

pub fn to_core_user(user: &TgUser) -> User {
    User {
        id: user.id.0 as i64,
        is_bot: user.is_bot,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}

pub fn to_core_chat(chat: &TgChat) -> Chat {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else if chat.is_group() {
        ChatKind::Group
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else {
        ChatKind::Channel
    };
    let title = chat
        .title()
        .or_else(|| chat.first_name())
        .map(str::to_string);
    Chat {
        id: chat.id.0,
        kind,
        title,
    }
}

pub fn to_core_message(msg: &TgMessage) -> Message {
    Message {
        id: msg.id.0,
        chat: to_core_chat(&msg.chat),
        from: msg.from.as_ref().map(to_core_user),
        text: msg.text().unwrap_or("").to_string(),
        date: msg.date,
        reply_to_message: msg
            .reply_to_message()
            .map(|replied| Box::new(to_core_message(replied))),
        is_forwarded: msg.forward_origin().is_some(),
    }
}

/// Poll answers go through their JSON form: the voter field's shape varies across
/// Bot API versions while `poll_id`, `user` and `option_ids` stay stable.
fn to_core_poll_answer(answer: &TgPollAnswer) -> Option<PollAnswer> {
    let value = serde_json::to_value(answer).ok()?;
    let poll_id = value.get("poll_id")?.as_str()?.to_string();
    let user = value
        .get("user")
        .and_then(|user| serde_json::from_value::<TgUser>(user.clone()).ok())
        .map(|user| to_core_user(&user));
    let option_ids = value
        .get("option_ids")
        .and_then(|ids| ids.as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_u64())
                .map(|id| id as u32)
                .collect()
        })
        .unwrap_or_default();
    Some(PollAnswer {
        poll_id,
        user,
        option_ids,
    })
}

/// Maps a teloxide update to a core [`Update`]. Kinds the bot does not handle become
/// `UpdateKind::Unsupported` so the dispatcher can drop them uniformly.
pub fn to_core_update(update: &TgUpdate) -> Update {
    let kind = match &update.kind {
        TgUpdateKind::Message(msg) => UpdateKind::Message(to_core_message(msg)),
        TgUpdateKind::CallbackQuery(query) => UpdateKind::CallbackQuery(CallbackQuery {
            id: query.id.0.clone(),
            from: to_core_user(&query.from),
            message: query.message.as_ref().map(|msg| MessageRef {
                chat_id: msg.chat().id.0,
                message_id: msg.id().0,
            }),
            data: query.data.clone(),
        }),
        TgUpdateKind::InlineQuery(query) => UpdateKind::InlineQuery(InlineQuery {
            id: query.id.0.clone(),
            from: to_core_user(&query.from),
            query: query.query.clone(),
        }),
        TgUpdateKind::PollAnswer(answer) => match to_core_poll_answer(answer) {
            Some(answer) => UpdateKind::PollAnswer(answer),
            None => {
                warn!(update_id = update.id.0, "Poll answer could not be read");
                UpdateKind::Unsupported
            }
        },
        _ => UpdateKind::Unsupported,
    };
    Update::new(i64::from(update.id.0), kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TgUpdate {
        serde_json::from_str(json).expect("valid Telegram update JSON")
    }

    /// **Test: TgUser converts to core User with id, bot flag and names.**
    #[test]
    fn test_user_to_core() {
        let user = TgUser {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let core_user = to_core_user(&user);

        assert_eq!(core_user.id, 123);
        assert!(!core_user.is_bot);
        assert_eq!(core_user.first_name, "Test");
        assert_eq!(core_user.last_name.as_deref(), Some("User"));
        assert_eq!(core_user.display_name(), "testuser");
    }

    /// **Test: A group text message keeps chat, sender, text and the replied-to message.**
    #[test]
    fn test_group_message_with_reply() {
        let update = parse(
            r#"{
            "update_id": 10,
            "message": {
                "message_id": 42,
                "date": 1706529600,
                "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
                "from": {"id": 7, "is_bot": false, "first_name": "Ana", "username": "ana_b"},
                "text": "/suba futebol",
                "reply_to_message": {
                    "message_id": 40,
                    "date": 1706529500,
                    "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
                    "from": {"id": 8, "is_bot": false, "first_name": "Bia"},
                    "text": "me too"
                }
            }
        }"#,
        );

        let core = to_core_update(&update);
        assert_eq!(core.id, 10);
        let msg = core.message().expect("message update");
        assert_eq!(msg.id, 42);
        assert_eq!(msg.chat.id, -100);
        assert_eq!(msg.chat.kind, ChatKind::Supergroup);
        assert_eq!(msg.chat.name(), "Futebol");
        assert_eq!(msg.text, "/suba futebol");
        assert!(!msg.is_forwarded);
        assert_eq!(msg.from.as_ref().map(|u| u.id), Some(7));
        let replied = msg.reply_to_message.as_ref().expect("reply");
        assert_eq!(replied.from.as_ref().map(|u| u.first_name.as_str()), Some("Bia"));
    }

    #[test]
    fn test_forwarded_private_message() {
        let update = parse(
            r#"{
            "update_id": 11,
            "message": {
                "message_id": 5,
                "date": 1706529600,
                "chat": {"id": 7, "type": "private", "first_name": "Ana"},
                "from": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "forward_origin": {
                    "type": "user",
                    "date": 1706529000,
                    "sender_user": {"id": 9, "is_bot": false, "first_name": "Caio"}
                },
                "text": "/suba x"
            }
        }"#,
        );

        let msg = to_core_update(&update).message().cloned().expect("message");
        assert!(msg.is_forwarded);
        assert!(msg.chat.is_private());
        assert_eq!(msg.chat.name(), "Ana");
    }

    /// **Test: A button press points at the chat and message carrying the keyboard.**
    #[test]
    fn test_callback_query_keeps_message_ref() {
        let update = parse(
            r#"{
            "update_id": 12,
            "callback_query": {
                "id": "4382",
                "from": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "chat_instance": "-42",
                "data": "0",
                "message": {
                    "message_id": 1000,
                    "date": 1706529600,
                    "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
                    "text": "yes (0 votes)"
                }
            }
        }"#,
        );

        let core = to_core_update(&update);
        let query = core.callback_query().expect("callback query");
        assert_eq!(query.id, "4382");
        assert_eq!(query.data.as_deref(), Some("0"));
        assert_eq!(
            query.message,
            Some(MessageRef {
                chat_id: -100,
                message_id: 1000
            })
        );
        assert_eq!(core.origin(), query.message);
    }

    #[test]
    fn test_inline_query() {
        let update = parse(
            r#"{
            "update_id": 13,
            "inline_query": {
                "id": "77",
                "from": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "query": "fut",
                "offset": ""
            }
        }"#,
        );

        let core = to_core_update(&update);
        let query = core.inline_query().expect("inline query");
        assert_eq!(query.id, "77");
        assert_eq!(query.query, "fut");
        assert_eq!(query.from.id, 7);
    }

    #[test]
    fn test_poll_answer() {
        let update = parse(
            r#"{
            "update_id": 14,
            "poll_answer": {
                "poll_id": "p1",
                "user": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "option_ids": [1]
            }
        }"#,
        );

        let core = to_core_update(&update);
        let answer = core.poll_answer().expect("poll answer");
        assert_eq!(answer.poll_id, "p1");
        assert_eq!(answer.option_ids, vec![1]);
        assert_eq!(answer.user.as_ref().map(|u| u.id), Some(7));
    }

    /// **Test: Kinds the bot does not handle map to Unsupported.**
    #[test]
    fn test_edited_message_is_unsupported() {
        let update = parse(
            r#"{
            "update_id": 15,
            "edited_message": {
                "message_id": 5,
                "date": 1706529600,
                "edit_date": 1706529700,
                "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
                "from": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "text": "edited"
            }
        }"#,
        );

        let core = to_core_update(&update);
        assert_eq!(core.kind, UpdateKind::Unsupported);
        assert_eq!(core.id, 15);
    }
}
