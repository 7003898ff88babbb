//! # Middleware
//!
//! Handler wrappers registered on the dispatcher with a guard:
//!
//! - [`UpdateLogging`] – logs each update and its outcome
//! - [`EnsureStarted`] – ignores messages from chats that never ran `/start`
//! - [`IgnoreForwardedCommand`] – ignores forwarded commands
//! - [`RequireAdmin`] – answers non-admins with a permission error
//!
//! [`AdminPolicy`] decides who counts as an admin; handlers use it too.

mod admin;
mod forwarded;
mod logging;
mod started;

#[cfg(test)]
mod test;

pub use admin::{AdminPolicy, RequireAdmin, PERMISSION_DENIED};
pub use forwarded::IgnoreForwardedCommand;
pub use logging::UpdateLogging;
pub use started::EnsureStarted;
