use serde::{Deserialize, Serialize};

/**
 * \brief Chat message; also the element type of the transcript store.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /** \brief Role: user/assistant/system, passed through unvalidated */
    pub role: String,
    /** \brief Content */
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/**
 * \brief Bearer token with its absolute expiry (epoch milliseconds).
 *
 * Doubles as the credential store layout and the body of a successful
 * credential exchange.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: i64,
}

impl Credential {
    /**
     * \brief True when the token is non-empty and `now_ms + margin_ms` is
     * still before the deadline. A negative margin counts as zero.
     */
    pub fn is_usable(&self, now_ms: i64, margin_ms: i64) -> bool {
        !self.access_token.is_empty() && now_ms.saturating_add(margin_ms.max(0)) < self.expires_at
    }
}

/**
 * \brief Completion request body.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub n: i64,
    pub max_tokens: i64,
    pub repetition_penalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub finish_reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: i32,
    #[serde(default)]
    pub completion_tokens: i32,
    #[serde(default)]
    pub total_tokens: i32,
}

/**
 * \brief Completion response body; only `choices` is required.
 */
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub object: String,
}
