use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "user";
pub const ASSISTANT_ROLE: &str = "assistant";
pub const STATUS_MESSAGE: &str = "ChatGPT Chat Server is running";

/// History entry as it arrives on the wire. Both fields may be missing or
/// `null`; `ChatTurn::from` applies the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawChatTurn {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        ChatTurn {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(DEFAULT_ROLE, content)
    }
}

impl From<RawChatTurn> for ChatTurn {
    // missing role -> "user", missing content -> ""
    fn from(raw: RawChatTurn) -> Self {
        ChatTurn {
            role: raw.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            content: raw.content.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "conversationHistory", default)]
    pub conversation_history: Vec<RawChatTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, conversation_history: Vec<RawChatTurn>) -> Self {
        ChatRequest {
            message: message.into(),
            conversation_history,
        }
    }

    /// History followed by the new message as a user turn. Order is kept and
    /// no entry is dropped.
    pub fn to_messages(&self) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(self.conversation_history.len() + 1);
        messages.extend(
            self.conversation_history
                .iter()
                .cloned()
                .map(ChatTurn::from),
        );
        messages.push(ChatTurn::user(self.message.clone()));
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub role: String,
}

impl ChatResponse {
    pub fn assistant(response: impl Into<String>) -> Self {
        ChatResponse {
            response: response.into(),
            role: ASSISTANT_ROLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceStatus {
    pub message: String,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus {
            message: STATUS_MESSAGE.to_string(),
        }
    }
}
