//! Chat message shapes forwarded by chat executors.
//!
//! These are boundary types: the core does not interpret them, it only routes
//! them by type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text)
    }
}

/// TurnToken は「ここまでの入力で 1 ターン処理してよい」という合図
///
/// `emit_events` は下流の agent executor にストリーミングイベントを出すかの指定。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit_events: Option<bool>,
}

impl TurnToken {
    pub fn new(emit_events: Option<bool>) -> Self {
        Self { emit_events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_role_serializes_lowercase() {
        let s = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["text"], "hi");
    }

    #[test]
    fn turn_token_omits_unset_flag() {
        let s = serde_json::to_string(&TurnToken::default()).unwrap();
        assert_eq!(s, "{}");
    }
}
