//! Route predicates over `(client, update)`.
//!
//! Predicates are pure: they never call the client, only read its username.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use topicbot_core::{MessagingClient, Update};

static COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\S+").expect("Failed to compile command regex"));

type Predicate = dyn Fn(&dyn MessagingClient, &Update) -> bool + Send + Sync;

/// Shareable boolean predicate deciding whether a route or middleware applies.
#[derive(Clone)]
pub struct Criteria(Arc<Predicate>);

impl Criteria {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn MessagingClient, &Update) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn matches(&self, bot: &dyn MessagingClient, update: &Update) -> bool {
        (self.0)(bot, update)
    }

    /// Both must match; `other` is not evaluated when `self` fails.
    pub fn and(self, other: Criteria) -> Criteria {
        Criteria::new(move |bot, update| self.matches(bot, update) && other.matches(bot, update))
    }
}

impl fmt::Debug for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Criteria")
    }
}

/// Conjunction, short-circuiting on the first failing predicate. Empty input always matches.
pub fn and(criteria: impl IntoIterator<Item = Criteria>) -> Criteria {
    let all: Vec<Criteria> = criteria.into_iter().collect();
    Criteria::new(move |bot, update| all.iter().all(|c| c.matches(bot, update)))
}

pub fn always() -> Criteria {
    Criteria::new(|_, _| true)
}

pub fn any_message() -> Criteria {
    Criteria::new(|_, update| update.message().is_some())
}

/// A message with non-empty text.
pub fn any_text() -> Criteria {
    Criteria::new(|_, update| !update.text().is_empty())
}

/// Text starting with `/` followed by at least one non-space character.
pub fn any_command() -> Criteria {
    Criteria::new(|_, update| COMMAND_RE.is_match(update.text()))
}

/// The first word is `/<name>`, optionally addressed as `/<name>@<bot username>`.
pub fn command(name: &str) -> Criteria {
    let expected = format!("/{}", name);
    Criteria::new(move |bot, update| {
        let Some(first) = update.text().split_whitespace().next() else {
            return false;
        };
        let suffix = format!("@{}", bot.username());
        first.strip_suffix(suffix.as_str()).unwrap_or(first) == expected
    })
}

pub fn any_callback_query() -> Criteria {
    Criteria::new(|_, update| update.callback_query().is_some())
}

pub fn any_inline_query() -> Criteria {
    Criteria::new(|_, update| update.inline_query().is_some())
}

pub fn any_poll_answer() -> Criteria {
    Criteria::new(|_, update| update.poll_answer().is_some())
}
