use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<Value>")]
pub enum ChatRole {
    #[default]
    User,
    Assistant,
}

impl ChatRole {
    /// Anything other than `assistant` is treated as the buyer speaking.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("assistant") {
            Self::Assistant
        } else {
            Self::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Option<Value>> for ChatRole {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::String(raw)) => Self::parse(&raw),
            _ => Self::User,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: ChatRole,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChatRole, ChatTurn};

    #[test]
    fn unrecognized_roles_become_user() {
        let turns: Vec<ChatTurn> = serde_json::from_value(json!([
            {"role": "assistant", "content": "Which grade?"},
            {"role": "system", "content": "ignored role"},
            {"role": "Buyer", "content": "SS316"},
            {"content": "no role at all"},
        ]))
        .expect("history should decode");

        let roles = turns.iter().map(|turn| turn.role).collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![ChatRole::Assistant, ChatRole::User, ChatRole::User, ChatRole::User]
        );
    }

    #[test]
    fn null_roles_and_scalar_content_are_tolerated() {
        let turns: Vec<ChatTurn> = serde_json::from_value(json!([
            {"role": null, "content": 5},
            {"role": 7, "content": null},
            {"role": "assistant", "content": "Any certificates?"},
            {"role": "user", "content": "None"},
        ]))
        .expect("loose history should decode");

        assert_eq!(turns[0], ChatTurn::user("5"));
        assert_eq!(turns[1], ChatTurn::user(""));
        assert_eq!(turns[2].role, ChatRole::Assistant);
        assert_eq!(turns[3].content, "None");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let value = serde_json::to_value(ChatTurn::assistant("hi")).expect("serialize turn");
        assert_eq!(value["role"], json!("assistant"));
    }
}
