// Completion service abstraction
//
// Strategies talk to a text-generation backend only through the
// `CompletionService` trait. The OpenAI-compatible HTTP implementation lives
// in `openai`; tests plug in scripted in-memory services.

use anyhow::Result;
use async_trait::async_trait;

pub mod factory;
pub mod openai;
pub mod retry;
pub mod types;

pub use factory::create_service;
pub use openai::OpenAIService;
pub use types::{Choice, CompletionRequest, CompletionResponse, Message, Role};

/// Trait for completion backends
///
/// One call takes a conversation plus sampling parameters and returns
/// `request.n` candidate completions with the token usage of that call.
/// Implementations decide their own transport behaviour; callers treat any
/// error as a failed call with nothing to account for.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Issue one completion request and wait for the full response
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Service name for logging (e.g. "openai", "groq")
    fn name(&self) -> &str;
}

/// Typed transport failures raised by HTTP services
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} API request failed\n\nStatus: {status}\nBody: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned no choices in response")]
    NoChoices { provider: String },
}
