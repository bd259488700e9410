// Request/response types for completion services
//
// These mirror the chat-completions shape (role-tagged messages in, `n`
// choices plus usage out) without tying callers to any provider's wire
// format. Each service implementation converts to and from its own API.

use serde::{Deserialize, Serialize};

use crate::usage::TokenUsage;

/// Speaker of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A single completion request
///
/// `max_tokens` and `temperature` are optional; when unset the service's
/// own defaults apply.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation sent as context
    pub messages: Vec<Message>,

    /// Number of independent completions to sample (>= 1)
    pub n: u32,

    /// Maximum tokens to generate per completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a request for a single completion of `messages`
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            n: 1,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set the sample count (clamped to at least 1)
    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One sampled completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub content: String,
}

impl Choice {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Result of one completion call: the choices in service order plus the
/// usage that call consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn new(choices: Vec<Choice>, usage: TokenUsage) -> Self {
        Self { choices, usage }
    }

    /// All choice texts, in response order
    pub fn texts(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.content.clone()).collect()
    }

    /// Text of the first choice, if any
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.content.as_str())
    }

    /// Consume the response, keeping only the choice texts
    pub fn into_texts(self) -> Vec<String> {
        self.choices.into_iter().map(|c| c.content).collect()
    }
}
