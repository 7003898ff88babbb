//! Admin checks and the admin-only middleware.

use std::sync::Arc;

use async_trait::async_trait;
use topicbot_core::{
    Chat, Handler, HandlerResponse, MessagingClient, Middleware, Result, Update,
};
use tracing::{info, warn};

pub const PERMISSION_DENIED: &str = "You don't have permission to do that.";

/// Who counts as an admin: everyone in a private chat, the configured bot owner,
/// and the chat's creator and administrators.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminPolicy {
    owner_id: Option<i64>,
}

impl AdminPolicy {
    pub fn new(owner_id: Option<i64>) -> Self {
        Self { owner_id }
    }

    /// True only for the configured bot owner.
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }

    pub async fn is_admin(
        &self,
        bot: &dyn MessagingClient,
        chat: &Chat,
        user_id: i64,
    ) -> Result<bool> {
        if chat.is_private() || self.is_owner(user_id) {
            return Ok(true);
        }
        let member = bot.get_chat_member(chat.id, user_id).await?;
        Ok(member.is_admin())
    }
}

/// Lets admins through and answers everyone else with [`PERMISSION_DENIED`].
pub struct RequireAdmin {
    policy: AdminPolicy,
}

impl RequireAdmin {
    pub fn new(policy: AdminPolicy) -> Self {
        Self { policy }
    }
}

impl Middleware for RequireAdmin {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(AdminOnly {
            policy: self.policy,
            next,
        })
    }
}

struct AdminOnly {
    policy: AdminPolicy,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for AdminOnly {
    async fn handle(&self, bot: &dyn MessagingClient, update: &Update) -> Result<HandlerResponse> {
        let Some((chat, user)) = update
            .message()
            .and_then(|m| m.from.as_ref().map(|from| (&m.chat, from)))
        else {
            warn!(update_id = update.id, "Admin check without chat or sender");
            return Ok(HandlerResponse::reply(PERMISSION_DENIED));
        };

        if !self.policy.is_admin(bot, chat, user.id).await? {
            info!(chat_id = chat.id, user_id = user.id, "Rejected non-admin");
            return Ok(HandlerResponse::reply(PERMISSION_DENIED));
        }
        self.next.handle(bot, update).await
    }
}
