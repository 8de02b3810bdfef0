use crate::error::RelayError;
use crate::quick_answers::QuickAnswerSet;
use log::debug;
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    /// Reads one inbound message. A missing or non-string `content` becomes "", while a
    /// missing or unknown `role` yields `None`.
    fn from_lenient_json(item: &JsonValue) -> Option<Self> {
        let role = serde_json::from_value::<Role>(item.get("role")?.clone()).ok()?;
        let content = item
            .get("content")
            .and_then(JsonValue::as_str)
            .unwrap_or("")
            .to_string();
        Some(Self { role, content })
    }
}

/// A validated inbound request body.
#[derive(Clone, Debug)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
}

impl Conversation {
    /// Validates a raw request body. Only a missing or non-array `messages` is rejected;
    /// entries without a known role are dropped.
    pub fn from_json(body: &JsonValue) -> Result<Self, RelayError> {
        let raw_messages = match body.get("messages") {
            Some(JsonValue::Array(items)) => items,
            _ => {
                return Err(
                    RelayError::InvalidInput(
                        "Invalid request format. Messages array is required.".to_string()
                    )
                );
            }
        };

        let messages = raw_messages
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let message = ChatMessage::from_lenient_json(item);
                if message.is_none() {
                    debug!("Dropping message at index {}: missing or unknown role", idx);
                }
                message
            })
            .collect();

        let model = body
            .get("model")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Ok(Self { messages, model })
    }

    /// Content of the most recent user turn, or "" when the user has not spoken.
    pub fn last_user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|msg| {
                let role_display = match msg.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                    Role::System => "System",
                };
                format!("{}: {}", role_display, msg.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: ChatMessage,
    pub quick_answers: QuickAnswerSet,
}

#[derive(Serialize, Debug, Clone)]
pub struct ModelList {
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary: String,
    pub continuation_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_body() {
        let body = json!({
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hi" }
            ],
            "model": "gpt-4"
        });
        let conversation = Conversation::from_json(&body).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role, Role::System);
        assert_eq!(conversation.model.as_deref(), Some("gpt-4"));
    }

    #[test]
    fn rejects_missing_or_non_array_messages() {
        for body in [json!({}), json!({ "messages": "hello" }), json!({ "messages": null })] {
            let err = Conversation::from_json(&body).unwrap_err();
            assert!(matches!(err, RelayError::InvalidInput(_)));
        }
    }

    #[test]
    fn drops_entries_without_a_known_role() {
        let body = json!({
            "messages": [
                { "role": "developer", "content": "x" },
                { "content": "no role" },
                "just a string",
                { "role": "user", "content": "kept" }
            ]
        });
        let conversation = Conversation::from_json(&body).unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.last_user_text(), "kept");
    }

    #[test]
    fn missing_or_non_string_content_reads_as_empty() {
        let body = json!({
            "messages": [
                { "role": "assistant", "content": 42 },
                { "role": "user" }
            ]
        });
        let conversation = Conversation::from_json(&body).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].content, "");
        assert_eq!(conversation.last_user_text(), "");
    }

    #[test]
    fn blank_model_is_treated_as_absent() {
        let body = json!({ "messages": [], "model": "  " });
        assert_eq!(Conversation::from_json(&body).unwrap().model, None);
    }

    #[test]
    fn last_user_text_skips_assistant_turns() {
        let body = json!({
            "messages": [
                { "role": "user", "content": "first" },
                { "role": "user", "content": "second" },
                { "role": "assistant", "content": "reply" }
            ]
        });
        let conversation = Conversation::from_json(&body).unwrap();
        assert_eq!(conversation.last_user_text(), "second");

        let empty = Conversation::from_json(&json!({ "messages": [] })).unwrap();
        assert_eq!(empty.last_user_text(), "");
    }

    #[test]
    fn summary_uses_camel_case_fields() {
        let summary = Summary {
            summary: "s".into(),
            continuation_prompt: "c".into(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value, json!({ "summary": "s", "continuationPrompt": "c" }));
    }
}
