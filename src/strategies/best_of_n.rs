// Best-of-N sampling
//
// One high-temperature call samples all candidates at once. Each candidate is
// then scored by a short low-temperature judge call against a fixed rubric.
// The judge exchange is appended through a scoped extension so every
// candidate is rated against the same clean context.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::constants::DEFAULT_MAX_TOKENS;
use crate::conversation::Conversation;
use crate::providers::{CompletionRequest, CompletionService, Message, ProviderError};
use crate::usage::TokenUsage;

/// Rubric given to the judge as a system message.
pub const RATING_PROMPT: &str = "Rate this response from 0-10 based on reasoning quality. \
Give high scores (8-10) if it shows clear step-by-step logical reasoning with well-supported conclusions. \
Give medium scores (4-7) for partial reasoning with gaps. \
Give low scores (0-3) for responses without clear logical steps. \
Return only the numerical score.";

/// User turn that asks the judge for its rating.
pub const RATE_REQUEST: &str = "Rate the above response:";

/// Sampling parameters for best-of-n
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BestOfNConfig {
    /// Number of candidates to sample
    pub n: u32,
    /// Temperature for candidate generation (high favours diversity)
    pub temperature: f32,
    /// Output cap per candidate
    pub max_tokens: u32,
    /// Temperature for judge calls
    pub judge_temperature: f32,
    /// Output cap per judge reply
    pub judge_max_tokens: u32,
    /// Rubric system message for the judge
    pub rubric: String,
}

impl Default for BestOfNConfig {
    fn default() -> Self {
        Self {
            n: 3,
            temperature: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            judge_temperature: 0.1,
            judge_max_tokens: 256,
            rubric: RATING_PROMPT.to_string(),
        }
    }
}

/// Outcome of one best-of-n run
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// Candidates in generation order
    pub candidates: Vec<String>,
    /// Judge score per candidate (0 where the reply was not a number)
    pub scores: Vec<f64>,
    /// Index of the winning candidate
    pub best_index: usize,
    /// Usage across generation and all judge calls
    pub usage: TokenUsage,
}

impl Selection {
    pub fn best(&self) -> &str {
        &self.candidates[self.best_index]
    }

    pub fn into_best(mut self) -> (String, TokenUsage) {
        let best = self.candidates.swap_remove(self.best_index);
        (best, self.usage)
    }
}

/// Generate-and-judge selector
pub struct BestOfN {
    service: Arc<dyn CompletionService>,
    model: String,
    config: BestOfNConfig,
}

impl BestOfN {
    pub fn new(
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
        config: BestOfNConfig,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            config,
        }
    }

    /// Sample, judge and select. Any service error aborts the whole run.
    pub async fn run(&self, system_prompt: &str, query: &str) -> Result<Selection> {
        tracing::info!("best_of_n: sampling {} candidates", self.config.n);
        let mut usage = TokenUsage::default();

        let base = Conversation::with_system_and_user(system_prompt, query);
        let request = CompletionRequest::new(&self.model, base.to_messages())
            .with_n(self.config.n)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        let response = self.service.complete(&request).await?;
        usage.merge(response.usage);

        let candidates = response.into_texts();
        if candidates.is_empty() {
            return Err(ProviderError::NoChoices {
                provider: self.service.name().to_string(),
            }
            .into());
        }
        tracing::info!(
            "Generated {} candidates ({} completion tokens)",
            candidates.len(),
            usage.completion_tokens
        );

        let mut judging = base;
        judging.push(Message::system(self.config.rubric.as_str()));

        let mut scores = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            let score = self.judge(&mut judging, candidate, &mut usage).await?;
            tracing::debug!("Candidate {} scored {}", index, score);
            scores.push(score);
        }

        let best_index = select_best(&scores);
        tracing::info!(
            "Selected candidate {} with score {}",
            best_index,
            scores[best_index]
        );

        Ok(Selection {
            candidates,
            scores,
            best_index,
            usage,
        })
    }

    /// Score one candidate. The exchange is removed from `judging` on return.
    async fn judge(
        &self,
        judging: &mut Conversation,
        candidate: &str,
        usage: &mut TokenUsage,
    ) -> Result<f64> {
        let scoped =
            judging.scoped_extend([Message::assistant(candidate), Message::user(RATE_REQUEST)]);

        let request = CompletionRequest::new(&self.model, scoped.to_messages())
            .with_n(1)
            .with_max_tokens(self.config.judge_max_tokens)
            .with_temperature(self.config.judge_temperature);
        let response = self.service.complete(&request).await?;
        usage.merge(response.usage);

        let reply = response.first_text().ok_or_else(|| ProviderError::NoChoices {
            provider: self.service.name().to_string(),
        })?;

        Ok(parse_score(reply).unwrap_or_else(|| {
            tracing::warn!("Judge reply is not a number, scoring 0: {:?}", reply);
            0.0
        }))
    }
}

/// Parse a judge reply as a bare finite number.
pub fn parse_score(reply: &str) -> Option<f64> {
    reply
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
}

/// Index of the highest score; the earliest index wins ties.
pub fn select_best(scores: &[f64]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = index;
        }
    }
    best
}

/// Run best-of-n with default sampling parameters and `n` candidates.
///
/// Returns the winning candidate verbatim and the usage of every call made.
pub async fn best_of_n_sampling(
    system_prompt: &str,
    initial_query: &str,
    service: Arc<dyn CompletionService>,
    model: &str,
    n: u32,
) -> Result<(String, TokenUsage)> {
    let config = BestOfNConfig {
        n,
        ..BestOfNConfig::default()
    };
    let selection = BestOfN::new(service, model, config)
        .run(system_prompt, initial_query)
        .await?;
    Ok(selection.into_best())
}
