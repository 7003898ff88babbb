//! Handler and Middleware traits.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{HandlerResponse, Update};
use crate::bot::MessagingClient;
use crate::error::Result;

/// Processes one update. Return `Reply` to have the dispatcher answer the user; return
/// `Err` for failures that are only logged.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse>;
}

/// Wraps a handler into another handler (e.g. to short-circuit, log, or guard it).
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// Handler backed by a closure over an owned copy of the update.
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Update) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
{
    async fn handle(&self, _bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        (self.f)(update.clone()).await
    }
}

/// Builds an `Arc<dyn Handler>` from an async closure.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Update) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
