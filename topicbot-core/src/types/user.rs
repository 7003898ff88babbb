//! User identity.

use serde::{Deserialize, Serialize};

/// Platform user (sender of a message, callback or inline query).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Username when set, otherwise the first name.
    pub fn display_name(&self) -> &str {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => username,
            _ => &self.first_name,
        }
    }
}
