//! Integration tests for [`topicbot_telegram::TelegramClient`] against a mockito Bot API server.
//!
//! Teloxide request path format is `/bot<token>/<method>`; every method is a POST with a JSON body.
//! Mock guards are held until the request completes, else the server answers with an empty body.

use std::time::Duration;

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use teloxide::Bot;
use topicbot_core::{
    ChatMemberStatus, EditMessageParams, InlineButton, InlineKeyboard, InlineQueryArticle,
    MessagingClient, ParseMode, SendMessageParams, SendPollParams,
};
use topicbot_telegram::{create_bot, TelegramClient};

const TEST_BOT_TOKEN: &str = "test_bot_token_12345";

const SENT_MESSAGE: &str = r#"{
    "ok": true,
    "result": {
        "message_id": 1000,
        "date": 1706529600,
        "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
        "from": {"id": 123456789, "is_bot": true, "first_name": "TopicBot", "username": "topicbot"},
        "text": "yes (0 votes)"
    }
}"#;

fn path(method: &str) -> String {
    format!("/bot{}/{}", TEST_BOT_TOKEN, method)
}

fn test_bot(server: &ServerGuard) -> Bot {
    let url = reqwest::Url::parse(&server.url()).expect("mock server URL");
    create_bot(TEST_BOT_TOKEN, Some(url), Duration::from_secs(5)).expect("bot")
}

async fn mock_get_me(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", path("getMe").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "ok": true,
            "result": {
                "id": 123456789,
                "is_bot": true,
                "first_name": "TopicBot",
                "username": "topicbot"
            }
        }"#,
        )
        .create_async()
        .await
}

async fn connected_client(server: &mut ServerGuard) -> (TelegramClient, Mock) {
    let get_me = mock_get_me(server).await;
    let client = TelegramClient::connect(test_bot(server))
        .await
        .expect("connect must succeed against the mock server");
    (client, get_me)
}

/// **Test: connect learns the bot username from getMe.**
#[tokio::test]
async fn test_connect_fetches_username() {
    let mut server = mockito::Server::new_async().await;
    let (client, get_me) = connected_client(&mut server).await;

    assert_eq!(client.username(), "topicbot");
    get_me.assert_async().await;
}

/// **Test: A threaded MarkdownV2 message with a keyboard is sent as one sendMessage call.**
///
/// **Setup:** getMe and sendMessage mocks; sendMessage matches the JSON body partially.
/// **Action:** send_message with reply_to, MarkdownV2 and a two-button keyboard.
/// **Expected:** The mock is hit once; the returned ids come from the response.
#[tokio::test]
async fn test_send_message_carries_reply_parse_mode_and_keyboard() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let send = server
        .mock("POST", path("sendMessage").as_str())
        .match_body(Matcher::PartialJson(json!({
            "chat_id": -100,
            "text": "*yes \\(0 votes\\)*",
            "parse_mode": "MarkdownV2",
            "reply_parameters": {"message_id": 42, "allow_sending_without_reply": true},
            "reply_markup": {"inline_keyboard": [[
                {"text": "yes", "callback_data": "0"},
                {"text": "no", "callback_data": "1"}
            ]]}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SENT_MESSAGE)
        .expect(1)
        .create_async()
        .await;

    let params = SendMessageParams::new(-100, "*yes \\(0 votes\\)*")
        .reply_to(42)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(InlineKeyboard::single_row(vec![
            InlineButton::new("yes", "0"),
            InlineButton::new("no", "1"),
        ]));
    let sent = client.send_message(params).await.unwrap();

    assert_eq!(sent.chat_id, -100);
    assert_eq!(sent.message_id, 1000);
    send.assert_async().await;
}

const SENT_POLL: &str = r#"{
    "ok": true,
    "result": {
        "message_id": 1001,
        "date": 1706529600,
        "chat": {"id": -100, "type": "supergroup", "title": "Futebol"},
        "from": {"id": 123456789, "is_bot": true, "first_name": "TopicBot", "username": "topicbot"},
        "poll": {
            "id": "5001",
            "question": "Pelada hoje?",
            "options": [
                {"text": "👍", "voter_count": 0},
                {"text": "👎", "voter_count": 0}
            ],
            "total_voter_count": 0,
            "is_closed": false,
            "is_anonymous": false,
            "type": "regular",
            "allows_multiple_answers": false
        }
    }
}"#;

/// **Test: A native poll goes out as sendPoll with named voters.**
#[tokio::test]
async fn test_send_poll_is_not_anonymous() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let send = server
        .mock("POST", path("sendPoll").as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "chat_id": -100,
                "question": "Pelada hoje?",
                "is_anonymous": false
            })),
            Matcher::Regex("👎".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SENT_POLL)
        .expect(1)
        .create_async()
        .await;

    let sent = client
        .send_poll(SendPollParams::new(
            -100,
            "Pelada hoje?",
            vec!["👍".to_string(), "👎".to_string()],
        ))
        .await
        .unwrap();

    assert_eq!(sent.message_id, 1001);
    send.assert_async().await;
}

#[tokio::test]
async fn test_edit_message_text() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let edit = server
        .mock("POST", path("editMessageText").as_str())
        .match_body(Matcher::PartialJson(json!({
            "chat_id": -100,
            "message_id": 1000,
            "parse_mode": "MarkdownV2"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SENT_MESSAGE)
        .expect(1)
        .create_async()
        .await;

    client
        .edit_message_text(
            EditMessageParams::new(-100, 1000, "*yes \\(1 votes\\)*")
                .parse_mode(ParseMode::MarkdownV2),
        )
        .await
        .unwrap();

    edit.assert_async().await;
}

/// **Test: Bot API errors surface as messaging errors.**
#[tokio::test]
async fn test_send_message_api_error() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let _send = server
        .mock("POST", path("sendMessage").as_str())
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let result = client.send_message(SendMessageParams::new(-1, "hi")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_get_chat_member_maps_status() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let _owner = server
        .mock("POST", path("getChatMember").as_str())
        .match_body(Matcher::PartialJson(json!({"chat_id": -100, "user_id": 7})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "ok": true,
            "result": {
                "status": "creator",
                "user": {"id": 7, "is_bot": false, "first_name": "Ana"},
                "is_anonymous": false
            }
        }"#,
        )
        .create_async()
        .await;
    let _left = server
        .mock("POST", path("getChatMember").as_str())
        .match_body(Matcher::PartialJson(json!({"chat_id": -100, "user_id": 8})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "ok": true,
            "result": {
                "status": "left",
                "user": {"id": 8, "is_bot": false, "first_name": "Bia"}
            }
        }"#,
        )
        .create_async()
        .await;

    let owner = client.get_chat_member(-100, 7).await.unwrap();
    assert_eq!(owner.status, ChatMemberStatus::Creator);
    assert!(owner.is_admin());

    let left = client.get_chat_member(-100, 8).await.unwrap();
    assert_eq!(left.status, ChatMemberStatus::Left);
    assert!(!left.is_admin());
}

#[tokio::test]
async fn test_answer_inline_query_sends_articles() {
    let mut server = mockito::Server::new_async().await;
    let (client, _get_me) = connected_client(&mut server).await;

    let answer = server
        .mock("POST", path("answerInlineQuery").as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"inline_query_id": "77"})),
            Matcher::Regex(r#""title":"Call #futebol""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": true, "result": true}"#)
        .expect(1)
        .create_async()
        .await;

    client
        .answer_inline_query(
            "77",
            vec![InlineQueryArticle {
                id: "futebol".to_string(),
                title: "Call #futebol".to_string(),
                message_text: "#futebol".to_string(),
            }],
        )
        .await
        .unwrap();

    answer.assert_async().await;
}
