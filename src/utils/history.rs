//! Normalize loosely-shaped message records into [`ChatTurn`]s.

use crate::types::{ChatRole, ChatTurn};
use serde_json::Value;

const TEXT_FIELDS: &[&str] = &["text", "message", "content"];

/// Convert message-like JSON records into chat turns.
///
/// - role: `user` or `assistant` (any case); anything else, or no role, becomes `user`
/// - text: the first non-empty string among `text`, `message`, `content`, else `""`
///
/// Never fails: non-object entries become empty user turns.
pub fn format_chat_history(messages: &[Value]) -> Vec<ChatTurn> {
    messages.iter().map(format_turn).collect()
}

fn format_turn(value: &Value) -> ChatTurn {
    let role = value
        .get("role")
        .and_then(|r| r.as_str())
        .and_then(ChatRole::parse)
        .unwrap_or(ChatRole::User);
    let text = TEXT_FIELDS
        .iter()
        .filter_map(|f| value.get(*f).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    ChatTurn::new(role, text)
}
