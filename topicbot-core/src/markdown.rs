//! MarkdownV2 helpers for text the bot renders itself.

/// Escapes every MarkdownV2 special character in `text`.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
            | '|' | '{' | '}' | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Inline mention of a user: `[name](tg://user?id=ID)` with the name escaped.
pub fn mention(name: &str, user_id: i64) -> String {
    format!("[{}](tg://user?id={})", escape_markdown_v2(name), user_id)
}
