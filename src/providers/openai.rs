// OpenAI-compatible completion service
//
// Works for OpenAI and every backend that speaks the same chat-completions
// format (Grok, Mistral, Groq, vLLM, llama.cpp server, ...).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::with_retry;
use super::types::{Choice, CompletionRequest, CompletionResponse, Message};
use super::{CompletionService, ProviderError};
use crate::config::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::usage::TokenUsage;

/// HTTP client for `/v1/chat/completions`
#[derive(Clone)]
pub struct OpenAIService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    provider_name: String,
    max_retries: u32,
}

impl OpenAIService {
    /// OpenAI's hosted API
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(Some(api_key), "https://api.openai.com", "openai")
    }

    /// Grok (X.AI), OpenAI-compatible
    pub fn new_grok(api_key: String) -> Result<Self> {
        Self::new(Some(api_key), "https://api.x.ai", "grok")
    }

    /// Mistral, OpenAI-compatible
    pub fn new_mistral(api_key: String) -> Result<Self> {
        Self::new(Some(api_key), "https://api.mistral.ai", "mistral")
    }

    /// Groq (by Groq Inc, not X.AI's Grok), OpenAI-compatible
    pub fn new_groq(api_key: String) -> Result<Self> {
        Self::new(Some(api_key), "https://api.groq.com/openai", "groq")
    }

    /// Any OpenAI-compatible server. Local servers often need no key.
    pub fn new_custom(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::new(api_key, base_url, "custom")
    }

    fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        provider_name: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider_name: provider_name.into(),
            max_retries: 0,
        })
    }

    /// Replace the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Override the base URL (e.g. a proxy in front of the hosted API)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Retry transient failures inside this service (default 0)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn to_openai_request<'a>(&self, request: &'a CompletionRequest) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            n: request.n,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn from_openai_response(&self, response: OpenAIResponse) -> Result<CompletionResponse> {
        if response.choices.is_empty() {
            return Err(ProviderError::NoChoices {
                provider: self.provider_name.clone(),
            }
            .into());
        }

        let mut choices = response.choices;
        choices.sort_by_key(|c| c.index);

        Ok(CompletionResponse {
            choices: choices
                .into_iter()
                .map(|c| Choice::new(c.message.content.unwrap_or_default()))
                .collect(),
            usage: response.usage.unwrap_or_default(),
        })
    }

    /// Send a single request (no retry)
    async fn complete_once(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.to_openai_request(request);

        tracing::debug!(
            provider = %self.provider_name,
            model = %request.model,
            n = request.n,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.provider_name))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: self.provider_name.clone(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.provider_name))?;

        tracing::debug!(
            provider = %self.provider_name,
            choices = openai_response.choices.len(),
            "Received completion response"
        );

        self.from_openai_response(openai_response)
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

#[async_trait]
impl CompletionService for OpenAIService {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        with_retry(self.max_retries, || self.complete_once(request)).await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    #[serde(default)]
    index: usize,
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
