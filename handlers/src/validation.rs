//! Topic name rules shared by every command taking a topic.

use topicbot_core::HandlerError;

pub const MAX_TOPIC_LEN: usize = 30;

/// Trims `topic` and checks it: not empty, at most [`MAX_TOPIC_LEN`] bytes, a single line,
/// and no spaces when it contains `#`. Returns the trimmed topic.
pub fn validate_topic(topic: &str) -> Result<&str, HandlerError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(HandlerError::InvalidTopic("topic is empty".to_string()));
    }
    if topic.len() > MAX_TOPIC_LEN {
        return Err(HandlerError::InvalidTopic("topic is too long".to_string()));
    }
    if topic.contains('\n') {
        return Err(HandlerError::InvalidTopic(
            "topic must fit in one line".to_string(),
        ));
    }
    if topic.contains('#') && topic.contains(' ') {
        return Err(HandlerError::InvalidTopic(
            "a topic with # cannot have spaces".to_string(),
        ));
    }
    Ok(topic)
}
