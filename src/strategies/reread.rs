// RE2 (re-reading): restate the question before answering
//
// The query is sent once, followed by "Read the question again: <query>",
// in a single call that samples `n` completions.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::conversation::Conversation;
use crate::providers::{CompletionRequest, CompletionService, ProviderError};
use crate::usage::TokenUsage;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RereadConfig {
    /// Completions to sample in the single call
    pub n: u32,
}

impl Default for RereadConfig {
    fn default() -> Self {
        Self { n: 1 }
    }
}

/// RE2 result: a single text for `n = 1`, otherwise every completion in
/// response order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RereadOutput {
    Single(String),
    Multiple(Vec<String>),
}

impl RereadOutput {
    /// All texts, in response order
    pub fn texts(&self) -> Vec<&str> {
        match self {
            RereadOutput::Single(text) => vec![text.as_str()],
            RereadOutput::Multiple(texts) => texts.iter().map(String::as_str).collect(),
        }
    }
}

/// The augmented user message
pub fn re2_prompt(query: &str) -> String {
    format!("{query}\nRead the question again: {query}")
}

pub struct Reread {
    service: Arc<dyn CompletionService>,
    model: String,
    config: RereadConfig,
}

impl Reread {
    pub fn new(
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
        config: RereadConfig,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            config,
        }
    }

    /// Issue the single RE2 call. Service errors are logged and returned as-is.
    pub async fn run(&self, system_prompt: &str, query: &str) -> Result<(RereadOutput, TokenUsage)> {
        tracing::info!("Using RE2 approach for query processing");
        let mut usage = TokenUsage::default();

        let conversation = Conversation::with_system_and_user(system_prompt, re2_prompt(query));
        let request =
            CompletionRequest::new(&self.model, conversation.to_messages()).with_n(self.config.n);

        let response = match self.service.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error in RE2 approach: {:#}", e);
                return Err(e);
            }
        };
        usage.merge(response.usage);

        let mut texts: Vec<String> = response
            .into_texts()
            .into_iter()
            .map(|text| text.trim().to_string())
            .collect();

        let output = if self.config.n == 1 {
            if texts.is_empty() {
                let e = anyhow::Error::from(ProviderError::NoChoices {
                    provider: self.service.name().to_string(),
                });
                tracing::error!("Error in RE2 approach: {:#}", e);
                return Err(e);
            }
            RereadOutput::Single(texts.swap_remove(0))
        } else {
            RereadOutput::Multiple(texts)
        };

        Ok((output, usage))
    }
}

/// Run RE2 with `n` completions.
pub async fn re2_approach(
    system_prompt: &str,
    initial_query: &str,
    service: Arc<dyn CompletionService>,
    model: &str,
    n: u32,
) -> Result<(RereadOutput, TokenUsage)> {
    Reread::new(service, model, RereadConfig { n })
        .run(system_prompt, initial_query)
        .await
}
