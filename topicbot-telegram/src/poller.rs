//! Long-poll update source: calls `getUpdates` in a loop, converts each update and pushes it
//! into the dispatcher's channel. Stops when the receiving side is dropped.

use std::time::Duration;

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use topicbot_core::Update;

use crate::convert::to_core_update;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Spawns the polling loop. `timeout_secs` is the server-side long-poll timeout; the bot's
/// HTTP client timeout must exceed it (see [`crate::create_bot`]).
pub fn spawn_update_poller(
    bot: Bot,
    updates: mpsc::Sender<Update>,
    timeout_secs: u32,
) -> JoinHandle<()> {
    tokio::spawn(poll_updates(bot, updates, timeout_secs))
}

/// Offset acknowledging `update_id`; Bot API offsets are i32, so ids past its range saturate.
fn next_offset(update_id: u32) -> i32 {
    i32::try_from(update_id)
        .map(|id| id.saturating_add(1))
        .unwrap_or(i32::MAX)
}

#[instrument(skip(bot, updates))]
async fn poll_updates(bot: Bot, updates: mpsc::Sender<Update>, timeout_secs: u32) {
    let mut offset: i32 = 0;
    let mut backoff = INITIAL_BACKOFF;
    info!(timeout_secs, "Update poller started");

    loop {
        let batch = match bot
            .get_updates()
            .offset(offset)
            .timeout(timeout_secs)
            .await
        {
            Ok(batch) => {
                backoff = INITIAL_BACKOFF;
                batch
            }
            Err(e) => {
                error!(error = %e, retry_in_secs = backoff.as_secs(), "getUpdates failed");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        for update in batch {
            offset = next_offset(update.id.0);
            let core = to_core_update(&update);
            debug!(update_id = core.id, kind = core.kind_name(), "step: update received");
            if updates.send(core).await.is_err() {
                info!("Update channel closed, poller stopped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_offset_saturates() {
        assert_eq!(next_offset(0), 1);
        assert_eq!(next_offset(41), 42);
        assert_eq!(next_offset(i32::MAX as u32), i32::MAX);
        assert_eq!(next_offset(u32::MAX), i32::MAX);
    }
}
