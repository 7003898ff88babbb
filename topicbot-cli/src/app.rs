//! Wires store, Telegram client, handlers and middlewares into a running bot.

use std::sync::Arc;

use anyhow::{Context, Result};
use dispatcher::criteria::{
    always, any_callback_query, any_command, any_inline_query, any_message, any_poll_answer,
    any_text, command,
};
use dispatcher::Dispatcher;
use handlers::{
    spawn_scheduled_mentions, EventCommand, EventHandler, FeatureAction, FeatureHandler,
    InlineTopicHandler, PollCommand, PollHandler, PollLocks, ScheduleHandler, StartHandler,
    TopicCommand, TopicHandler, DEFAULT_SCHEDULE_INTERVAL,
};
use middleware::{AdminPolicy, EnsureStarted, IgnoreForwardedCommand, RequireAdmin, UpdateLogging};
use storage::{SqliteStore, Store};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use topicbot_core::{init_tracing, Handler, MessagingClient};
use topicbot_telegram::{create_bot, spawn_update_poller, TelegramClient};

use crate::config::BotConfig;

/// Updates buffered between the poller and the dispatcher.
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Registers every command route and middleware.
///
/// Routes are tried in order; plain `#topic` text comes last so commands win. Middlewares
/// registered later wrap the ones registered earlier: logging is outermost, the admin check
/// innermost.
pub fn build_dispatcher(
    bot: Arc<dyn MessagingClient>,
    store: Arc<dyn Store>,
    admins: AdminPolicy,
    concurrency_limit: usize,
) -> Dispatcher {
    let locks = Arc::new(PollLocks::new());
    let topics = |command: TopicCommand| -> Arc<dyn Handler> {
        Arc::new(TopicHandler::new(command, store.clone(), admins))
    };
    let polls = |command: PollCommand| -> Arc<dyn Handler> {
        Arc::new(PollHandler::new(command, store.clone(), locks.clone()))
    };
    let features = |action: FeatureAction| -> Arc<dyn Handler> {
        Arc::new(FeatureHandler::new(action, store.clone()))
    };
    let events = |command: EventCommand| -> Arc<dyn Handler> {
        Arc::new(EventHandler::new(command, store.clone(), admins))
    };

    Dispatcher::new(bot)
        .with_concurrency_limit(concurrency_limit)
        .handle(command("start"), Arc::new(StartHandler::new(store.clone())))
        .handle(command("suba"), topics(TopicCommand::Subscribe))
        .handle(command("desca"), topics(TopicCommand::Unsubscribe))
        .handle(command("quem"), topics(TopicCommand::ListSubscribers))
        .handle(command("lista"), topics(TopicCommand::ListUserTopics))
        .handle(command("listudo"), topics(TopicCommand::ListChatTopics))
        .handle(command("bora"), polls(PollCommand::Call))
        .handle(command("pollo"), polls(PollCommand::Native))
        .handle(command("agenda"), Arc::new(ScheduleHandler::new(store.clone())))
        .handle(command("conta"), events(EventCommand::Count))
        .handle(command("desconta"), events(EventCommand::Uncount))
        .handle(command("enable"), features(FeatureAction::Enable))
        .handle(command("disable"), features(FeatureAction::Disable))
        .handle(any_callback_query(), polls(PollCommand::Vote))
        .handle(any_poll_answer(), polls(PollCommand::Answer))
        .handle(any_inline_query(), Arc::new(InlineTopicHandler))
        .handle(any_text(), polls(PollCommand::Hashtag))
        .middleware(command("enable"), Arc::new(RequireAdmin::new(admins)))
        .middleware(command("disable"), Arc::new(RequireAdmin::new(admins)))
        .middleware(any_command(), Arc::new(IgnoreForwardedCommand))
        .middleware(any_message(), Arc::new(EnsureStarted::new(store.clone())))
        .middleware(always(), Arc::new(UpdateLogging))
}

/// Creates the database schema and exits.
#[instrument]
pub async fn run_migrate(database_url: &str) -> Result<()> {
    SqliteStore::new(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;
    info!(database_url = %database_url, "Schema is up to date");
    Ok(())
}

/// Main entry: validate config, init logging, open the store, connect to Telegram, then
/// poll, dispatch and send scheduled mentions until Ctrl-C.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    if let Some(dir) = std::path::Path::new(&config.log_file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).context("Failed to create log directory")?;
        }
    }
    init_tracing(&config.log_file)?;

    info!(
        database_url = %config.database_url,
        max_concurrent_handlers = config.max_concurrent_handlers,
        "Initializing bot"
    );

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::new(&config.database_url)
            .await
            .context("Failed to open database")?,
    );
    let teloxide_bot = create_bot(
        &config.bot_token,
        config.api_url()?,
        config.request_timeout(),
    )?;
    let client = TelegramClient::connect(teloxide_bot.clone())
        .await
        .context("Failed to connect to Telegram")?;

    let client: Arc<dyn MessagingClient> = Arc::new(client);

    let dispatcher = build_dispatcher(
        client.clone(),
        store.clone(),
        AdminPolicy::new(config.admin_user_id),
        config.max_concurrent_handlers,
    );

    let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
    let poller = spawn_update_poller(teloxide_bot, tx, config.poll_timeout_secs);
    let scheduler = spawn_scheduled_mentions(client, store, DEFAULT_SCHEDULE_INTERVAL);
    let running = tokio::spawn(dispatcher.start(rx));

    info!("Bot started successfully");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested, stopping poller");

    // Dropping the poller's sender closes the channel; the dispatcher drains and returns.
    poller.abort();
    scheduler.abort();
    if let Err(e) = running.await {
        error!(error = %e, "Dispatcher task failed");
    }
    info!("Bot stopped");
    Ok(())
}
