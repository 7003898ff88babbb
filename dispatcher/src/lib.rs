//! # Dispatcher
//!
//! Routes each inbound update to the first registered handler whose criteria match, wraps it
//! in the middlewares whose guards match, and runs it on a bounded pool of tokio tasks.
//! A `Reply` result is sent back to the originating chat; errors and panics are logged.

pub mod criteria;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, instrument, trace, warn};

use topicbot_core::{
    Handler, HandlerResponse, MessagingClient, Middleware, Reply, SendMessageParams, Update,
};

pub use criteria::Criteria;

/// Handlers running at once when no limit is configured.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

struct Route {
    criteria: Criteria,
    handler: Arc<dyn Handler>,
}

struct Layer {
    criteria: Criteria,
    middleware: Arc<dyn Middleware>,
}

/// Update router built before [`Dispatcher::start`]; registrations are append-only.
pub struct Dispatcher {
    bot: Arc<dyn MessagingClient>,
    routes: Vec<Route>,
    layers: Vec<Layer>,
    concurrency_limit: usize,
}

impl Dispatcher {
    pub fn new(bot: Arc<dyn MessagingClient>) -> Self {
        Self {
            bot,
            routes: Vec::new(),
            layers: Vec::new(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }

    /// Sets how many handlers may run at once (at least one).
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Appends a route. Earlier routes win when several match.
    pub fn handle(mut self, criteria: Criteria, handler: Arc<dyn Handler>) -> Self {
        self.routes.push(Route { criteria, handler });
        self
    }

    /// Appends a middleware applied to the matched handler when `criteria` matches the update.
    /// The first registered middleware is the innermost.
    pub fn middleware(mut self, criteria: Criteria, middleware: Arc<dyn Middleware>) -> Self {
        self.layers.push(Layer {
            criteria,
            middleware,
        });
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Selects the first matching route and wraps it in the middlewares whose guards match.
    pub fn route(&self, update: &Update) -> Option<Arc<dyn Handler>> {
        let bot = self.bot.as_ref();
        let route = self
            .routes
            .iter()
            .find(|route| route.criteria.matches(bot, update))?;

        let handler = self
            .layers
            .iter()
            .fold(route.handler.clone(), |inner, layer| {
                if layer.criteria.matches(bot, update) {
                    layer.middleware.wrap(inner)
                } else {
                    inner
                }
            });
        Some(handler)
    }

    /// Runs one update to completion: route, invoke once, send the reply if any.
    /// Panics inside the handler chain are contained and logged.
    #[instrument(skip(self, update), fields(update_id = update.id, kind = update.kind_name()))]
    pub async fn dispatch(&self, update: Update) {
        let Some(handler) = self.route(&update) else {
            trace!(update_id = update.id, "step: no route matched, update dropped");
            return;
        };

        debug!(update_id = update.id, "step: handler started");
        let outcome = AssertUnwindSafe(handler.handle(self.bot.as_ref(), &update))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(HandlerResponse::Done)) => {
                debug!(update_id = update.id, "step: handler done");
            }
            Ok(Ok(HandlerResponse::Reply(reply))) => {
                self.send_reply(&update, reply).await;
            }
            Ok(Err(e)) => {
                error!(update_id = update.id, error = %e, "Handler failed");
            }
            Err(payload) => {
                error!(
                    update_id = update.id,
                    panic = %panic_message(payload.as_ref()),
                    "Handler panicked, update dropped"
                );
            }
        }
    }

    async fn send_reply(&self, update: &Update, reply: Reply) {
        let Some(origin) = update.origin() else {
            warn!(
                update_id = update.id,
                kind = update.kind_name(),
                "Reply dropped: update has no originating chat"
            );
            return;
        };

        let params = SendMessageParams::from_reply(origin.chat_id, origin.message_id, reply);
        match self.bot.send_message(params).await {
            Ok(sent) => debug!(
                update_id = update.id,
                chat_id = sent.chat_id,
                message_id = sent.message_id,
                "step: reply sent"
            ),
            Err(e) => error!(update_id = update.id, error = %e, "Failed to send reply"),
        }
    }

    /// Consumes updates until the channel closes, running at most `concurrency_limit`
    /// handlers at once. Returns after every spawned task has finished.
    pub async fn start(self, mut updates: mpsc::Receiver<Update>) {
        let limit = self.concurrency_limit;
        let dispatcher = Arc::new(self);
        let semaphore = Arc::new(Semaphore::new(limit));

        info!(
            routes = dispatcher.routes.len(),
            middlewares = dispatcher.layers.len(),
            concurrency_limit = limit,
            "Dispatcher started"
        );

        while let Some(update) = updates.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let _permit = permit;
                dispatcher.dispatch(update).await;
            });
        }

        info!("Update source closed, waiting for in-flight handlers");
        // Every task holds one permit until it ends, panics included.
        let _drained = semaphore.acquire_many(limit as u32).await;
        info!("Dispatcher stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
