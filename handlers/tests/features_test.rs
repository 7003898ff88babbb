//! Integration tests for feature toggles and inline topic suggestions.

mod common;

use common::{started_store, CHAT};
use handlers::{FeatureAction, FeatureHandler, InlineTopicHandler};
use storage::{ChatFeature, Store};
use topicbot_core::testing::{inline_update, text_update, MockClient};
use topicbot_core::{Handler, HandlerResponse};

#[tokio::test]
async fn test_enable_and_disable_feature() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let enable = FeatureHandler::new(FeatureAction::Enable, store.clone());
    let disable = FeatureHandler::new(FeatureAction::Disable, store.clone());

    let response = enable
        .handle(&bot, &text_update(1, CHAT, 1, "/enable create_topics"))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::reply("Enabled create_topics."));
    assert!(store.chat_enables(CHAT, ChatFeature::CreateTopics).await.unwrap());

    let response = disable
        .handle(&bot, &text_update(2, CHAT, 1, "/disable create_topics"))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::reply("Disabled create_topics."));
    assert!(!store.chat_enables(CHAT, ChatFeature::CreateTopics).await.unwrap());
}

#[tokio::test]
async fn test_unknown_feature_lists_available() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let enable = FeatureHandler::new(FeatureAction::Enable, store.clone());

    let response = enable
        .handle(&bot, &text_update(1, CHAT, 1, "/enable audio"))
        .await
        .unwrap();
    assert_eq!(
        response,
        HandlerResponse::reply("unknown feature: audio. Available: create_topics")
    );

    let response = enable
        .handle(&bot, &text_update(2, CHAT, 1, "/enable"))
        .await
        .unwrap();
    assert_eq!(
        response,
        HandlerResponse::reply("Which feature? Available: create_topics")
    );
}

#[tokio::test]
async fn test_inline_query_offers_hashtag() {
    let bot = MockClient::new("TopicBot");

    InlineTopicHandler
        .handle(&bot, &inline_update(1, 1, "futebol"))
        .await
        .unwrap();
    InlineTopicHandler
        .handle(&bot, &inline_update(2, 1, "   "))
        .await
        .unwrap();

    let answers = bot.inline_answers();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].0, "iq1");
    assert_eq!(answers[0].1.len(), 1);
    assert_eq!(answers[0].1[0].title, "Call #futebol");
    assert_eq!(answers[0].1[0].message_text, "#futebol");
    assert!(answers[1].1.is_empty());
}
