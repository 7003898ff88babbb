//! Integration tests for calling subscribers and the vote buttons.

mod common;

use std::sync::Arc;

use common::{started_store, subscribe, CHAT};
use handlers::{cast_vote, PollCommand, PollHandler, PollLocks, VoteState};
use storage::{Poll, SqliteStore, Store, Vote};
use topicbot_core::testing::{callback_update, poll_answer_update, text_update, user, MockClient};
use topicbot_core::{BotError, Handler, HandlerError, HandlerResponse, InlineButton, ParseMode};

fn poll_handler(command: PollCommand, store: &Arc<SqliteStore>, locks: &Arc<PollLocks>) -> PollHandler {
    PollHandler::new(command, store.clone(), locks.clone())
}

/// Sends `/bora futebol` and returns the id of the tally message.
/// MockClient numbers sent messages from 1000.
async fn call_futebol(bot: &MockClient, store: &Arc<SqliteStore>, locks: &Arc<PollLocks>) -> i32 {
    poll_handler(PollCommand::Call, store, locks)
        .handle(bot, &text_update(50, CHAT, 1, "/bora futebol"))
        .await
        .unwrap();
    assert_eq!(bot.sent().len(), 1);
    1000
}

/// **Test: /bora sends the initial tally as a reply and records the poll.**
///
/// **Setup:** Two subscribers to "futebol".
/// **Action:** `/bora futebol`.
/// **Expected:** One MarkdownV2 message threaded to the command with everyone remaining
/// and 0/0 buttons; a poll row keyed by the sent message.
#[tokio::test]
async fn test_call_sends_tally_and_saves_poll() {
    let store = started_store().await;
    subscribe(&store, 1, "Ana", "futebol").await;
    subscribe(&store, 2, "Bia", "futebol").await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());

    let message_id = call_futebol(&bot, &store, &locks).await;

    let sent = bot.sent();
    assert_eq!(sent[0].chat_id, CHAT);
    assert_eq!(sent[0].reply_to_message_id, Some(50));
    assert!(sent[0].allow_sending_without_reply);
    assert_eq!(sent[0].parse_mode, ParseMode::MarkdownV2);
    assert!(sent[0].text.contains("*remaining \\(2 votes\\)*"));
    let keyboard = sent[0].reply_markup.clone().unwrap();
    assert_eq!(
        keyboard.rows[0],
        vec![InlineButton::new("👍 0", "0"), InlineButton::new("👎 0", "1")]
    );

    let poll = store
        .find_poll_by_message_id(CHAT, message_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(poll.topic, "futebol");
    assert_eq!(poll.id, format!("{}:{}", CHAT, message_id));
}

#[tokio::test]
async fn test_call_without_subscribers_replies() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());

    let response = poll_handler(PollCommand::Call, &store, &locks)
        .handle(&bot, &text_update(1, CHAT, 1, "/bora futebol"))
        .await
        .unwrap();

    assert_eq!(
        response,
        HandlerResponse::reply("Nobody is subscribed to this topic.")
    );
    assert!(bot.sent().is_empty());
}

/// **Test: `#topic` messages call subscribers without any chat setting, and stay quiet on
/// anything but a successful call.**
#[tokio::test]
async fn test_hashtag_calls_subscribers_quietly() {
    let store = started_store().await;
    subscribe(&store, 1, "Ana", "#futebol").await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());
    let handler = poll_handler(PollCommand::Hashtag, &store, &locks);

    let response = handler
        .handle(&bot, &text_update(1, CHAT, 2, "#futebol"))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Done);
    assert_eq!(bot.sent().len(), 1);
    assert_eq!(bot.sent()[0].reply_to_message_id, Some(1));
    assert!(store.find_poll_by_message_id(CHAT, 1000).await.unwrap().is_some());

    for text in ["#volei", "#futebol hoje?", "hello"] {
        let response = handler
            .handle(&bot, &text_update(2, CHAT, 2, text))
            .await
            .unwrap();
        assert_eq!(response, HandlerResponse::Done);
    }
    assert_eq!(bot.sent().len(), 1);

    handler
        .handle(&bot, &text_update(3, CHAT, 2, "  #futebol "))
        .await
        .unwrap();
    assert_eq!(bot.sent().len(), 2);
}

/// **Test: Vote toggling through the state machine.**
///
/// **Setup:** A poll on "futebol"; user 7 not subscribed.
/// **Action/Expected:** up → Voted(Up) and subscribed; up again → NoVote;
/// up then down → Voted(Down).
#[tokio::test]
async fn test_cast_vote_toggles() {
    let store = started_store().await;
    let poll = Poll::new(CHAT, 1000, "futebol");
    store.save_poll(&poll).await.unwrap();
    let store: &dyn Store = &*store;

    let state = cast_vote(store, &poll, 7, Vote::Up).await.unwrap();
    assert_eq!(state, VoteState::Voted(Vote::Up));
    assert!(store.exists_chat_topic(CHAT, "futebol").await.unwrap());

    let state = cast_vote(store, &poll, 7, Vote::Up).await.unwrap();
    assert_eq!(state, VoteState::NoVote);
    assert!(store.find_poll_vote(&poll.id, 7).await.unwrap().is_none());

    cast_vote(store, &poll, 7, Vote::Up).await.unwrap();
    let state = cast_vote(store, &poll, 7, Vote::Down).await.unwrap();
    assert_eq!(state, VoteState::Voted(Vote::Down));
    assert_eq!(
        store.find_poll_vote(&poll.id, 7).await.unwrap().unwrap().vote,
        Vote::Down
    );
}

/// **Test: A button press edits the tally in place with the new buckets.**
///
/// **Setup:** Subscribers A(1), B(2), C(3) called with /bora.
/// **Action:** A presses 👍, B presses 👎.
/// **Expected:** The last edit targets the tally message and shows 1/1/1 with A up,
/// B down, C remaining.
#[tokio::test]
async fn test_votes_edit_tally() {
    let store = started_store().await;
    subscribe(&store, 1, "A", "futebol").await;
    subscribe(&store, 2, "B", "futebol").await;
    subscribe(&store, 3, "C", "futebol").await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());
    let message_id = call_futebol(&bot, &store, &locks).await;
    let votes = poll_handler(PollCommand::Vote, &store, &locks);

    votes
        .handle(&bot, &callback_update(60, user(1, "A"), CHAT, message_id, "0"))
        .await
        .unwrap();
    votes
        .handle(&bot, &callback_update(61, user(2, "B"), CHAT, message_id, "1"))
        .await
        .unwrap();

    let edits = bot.edits();
    assert_eq!(edits.len(), 2);
    let last = edits.last().unwrap();
    assert_eq!(last.chat_id, CHAT);
    assert_eq!(last.message_id, message_id);
    assert_eq!(last.parse_mode, ParseMode::MarkdownV2);
    assert_eq!(
        last.text,
        "*yes \\(1 votes\\)*\n[A](tg://user?id=1)\n\n\
         *no \\(1 votes\\)*\n[B](tg://user?id=2)\n\n\
         *remaining \\(1 votes\\)*\n[C](tg://user?id=3)"
    );
    assert_eq!(
        last.reply_markup.clone().unwrap().rows[0],
        vec![InlineButton::new("👍 1", "0"), InlineButton::new("👎 1", "1")]
    );
    assert!(locks.is_empty());
}

/// **Test: A non-subscriber pressing 👎 changes nothing visible; 👍 subscribes them.**
#[tokio::test]
async fn test_outsider_vote() {
    let store = started_store().await;
    subscribe(&store, 1, "A", "futebol").await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());
    let message_id = call_futebol(&bot, &store, &locks).await;
    let votes = poll_handler(PollCommand::Vote, &store, &locks);

    let response = votes
        .handle(&bot, &callback_update(60, user(9, "Zé"), CHAT, message_id, "1"))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Done);
    assert!(bot.edits().is_empty());

    votes
        .handle(&bot, &callback_update(61, user(9, "Zé"), CHAT, message_id, "0"))
        .await
        .unwrap();
    assert_eq!(bot.edits().len(), 1);
    assert!(bot.edits()[0].text.contains("[Zé](tg://user?id=9)"));
    assert_eq!(store.find_users_by_topic(CHAT, "futebol").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_vote_errors() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());
    let votes = poll_handler(PollCommand::Vote, &store, &locks);

    let err = votes
        .handle(&bot, &callback_update(1, user(1, "A"), CHAT, 4242, "0"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BotError::Handler(HandlerError::PollNotFound { message_id: 4242, .. })
    ));

    store.save_poll(&Poll::new(CHAT, 4242, "x")).await.unwrap();
    let err = votes
        .handle(&bot, &callback_update(2, user(1, "A"), CHAT, 4242, "up"))
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Handler(HandlerError::InvalidVote(_))));
}

/// **Test: Concurrent presses on one poll never lose a vote.**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_on_one_poll() {
    let store = started_store().await;
    for id in 1..=8 {
        subscribe(&store, id, &format!("u{}", id), "futebol").await;
    }
    let bot = Arc::new(MockClient::new("TopicBot"));
    let locks = Arc::new(PollLocks::new());
    let message_id = call_futebol(&bot, &store, &locks).await;
    let votes = Arc::new(poll_handler(PollCommand::Vote, &store, &locks));

    let mut tasks = Vec::new();
    for id in 1..=8 {
        let (votes, bot) = (votes.clone(), bot.clone());
        tasks.push(tokio::spawn(async move {
            votes
                .handle(
                    bot.as_ref(),
                    &callback_update(100 + id, user(id, "u"), CHAT, message_id, "0"),
                )
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let poll_id = Poll::id_for(CHAT, message_id);
    assert_eq!(store.find_poll_votes(&poll_id).await.unwrap().len(), 8);
    assert!(bot.edits().last().unwrap().text.starts_with("*yes \\(8 votes\\)*"));
}

/// **Test: /pollo sends a named 👍/👎 poll; without a question it asks for one.**
#[tokio::test]
async fn test_native_poll() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());
    let handler = poll_handler(PollCommand::Native, &store, &locks);

    let response = handler
        .handle(&bot, &text_update(1, CHAT, 1, "/pollo   "))
        .await
        .unwrap();
    assert_eq!(
        response,
        HandlerResponse::reply("Which question? Use /pollo <question>.")
    );
    assert!(bot.polls().is_empty());

    let response = handler
        .handle(&bot, &text_update(2, CHAT, 1, "/pollo pelada hoje?"))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Done);

    let polls = bot.polls();
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0].chat_id, CHAT);
    assert_eq!(polls[0].question, "pelada hoje?");
    assert_eq!(polls[0].options, vec!["👍".to_string(), "👎".to_string()]);
    assert!(!polls[0].is_anonymous);
    assert!(bot.sent().is_empty());
}

#[tokio::test]
async fn test_native_poll_answer_refreshes_voter() {
    let store = started_store().await;
    let bot = MockClient::new("TopicBot");
    let locks = Arc::new(PollLocks::new());

    let response = poll_handler(PollCommand::Answer, &store, &locks)
        .handle(&bot, &poll_answer_update(1, "5001", user(4, "Duda"), vec![0]))
        .await
        .unwrap();

    assert_eq!(response, HandlerResponse::Done);
    assert_eq!(store.find_user(4).await.unwrap().unwrap().first_name, "Duda");
    assert!(bot.sent().is_empty());
}
