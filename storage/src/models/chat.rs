//! Chat record and per-chat feature toggles.
//!
//! Maps to the `chat` and `chat_feature` tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A chat that has been `/start`ed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRecord {
    pub id: i64,
    pub title: String,
}

impl ChatRecord {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Per-chat toggles; stored by name in `chat_feature.feature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatFeature {
    /// Members without admin rights may create new topics.
    CreateTopics,
}

impl ChatFeature {
    pub const ALL: [ChatFeature; 1] = [ChatFeature::CreateTopics];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatFeature::CreateTopics => "create_topics",
        }
    }
}

impl fmt::Display for ChatFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatFeature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s.trim())
            .ok_or_else(|| format!("unknown feature: {}", s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_parse() {
        assert_eq!(
            " create_topics ".parse::<ChatFeature>(),
            Ok(ChatFeature::CreateTopics)
        );
        assert!("Create_Topics".parse::<ChatFeature>().is_err());
        assert!("hashtags".parse::<ChatFeature>().is_err());
    }
}
