// Plan search: observe, derive, synthesize, implement
//
// One run is a four-stage chain:
//
// ```
// problem ──► observations ──► derived observations ──► solution ──► implementation
// ```
//
// Every stage is a fresh `[system, user]` conversation, so runs share nothing
// but the service handle. Each run keeps its own `TokenUsage`; the multi-run
// total is a reduction over run totals, which makes sequential and
// concurrent execution produce the same numbers.

use anyhow::Result;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::constants::DEFAULT_MAX_TOKENS;
use crate::conversation::Conversation;
use crate::providers::{CompletionRequest, CompletionService, ProviderError};
use crate::usage::TokenUsage;

/// Parameters for plan search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSearchConfig {
    /// Number of independent runs
    pub n: u32,
    /// Observations requested in the first stage
    pub initial_observations: usize,
    /// Observations requested in the derivation stage
    pub derived_observations: usize,
    /// Output cap for every stage call
    pub max_tokens: u32,
    /// Drive runs concurrently instead of one after another
    pub concurrent_runs: bool,
}

impl Default for PlanSearchConfig {
    fn default() -> Self {
        Self {
            n: 1,
            initial_observations: 3,
            derived_observations: 2,
            max_tokens: DEFAULT_MAX_TOKENS,
            concurrent_runs: false,
        }
    }
}

/// Where an observation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationOrigin {
    Initial,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub text: String,
    pub origin: ObservationOrigin,
}

/// Observations of one run, in generation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservationSet {
    items: Vec<Observation>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `texts` tagged with `origin`
    pub fn extend<I>(&mut self, origin: ObservationOrigin, texts: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.items
            .extend(texts.into_iter().map(|text| Observation { text, origin }));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.items.iter()
    }

    /// All observation texts, initial first, in generation order
    pub fn texts(&self) -> Vec<String> {
        self.items.iter().map(|o| o.text.clone()).collect()
    }

    pub fn initial(&self) -> Vec<&str> {
        self.with_origin(ObservationOrigin::Initial)
    }

    pub fn derived(&self) -> Vec<&str> {
        self.with_origin(ObservationOrigin::Derived)
    }

    fn with_origin(&self, origin: ObservationOrigin) -> Vec<&str> {
        self.items
            .iter()
            .filter(|o| o.origin == origin)
            .map(|o| o.text.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Terminal output of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionArtifact {
    /// Natural-language, insight-quoting solution
    pub solution: String,
    /// Concrete implementation of that solution
    pub implementation: String,
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct PlanRun {
    pub observations: ObservationSet,
    pub artifact: SolutionArtifact,
    pub usage: TokenUsage,
}

/// Split a stage reply into one observation per line, trimmed, blanks dropped.
pub fn parse_observations(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn observations_prompt(problem: &str, count: usize) -> String {
    format!(
        "You are an expert problem solver. You will be given a problem to analyze.\n\
         You will return several useful, non-obvious, and insightful observations about the problem that could help solve it.\n\
         Focus on identifying key patterns, constraints, and hidden relationships that might not be immediately apparent.\n\
         Be creative and think beyond conventional approaches.\n\n\
         Here is the problem:\n{problem}\n\n\
         Please provide {count} key observations."
    )
}

fn derived_observations_prompt(problem: &str, observations: &[String], count: usize) -> String {
    let listed = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| format!("{}. {}", i + 1, obs))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are an expert problem solver. You will be given a problem and several insightful observations about it.\n\
         You will brainstorm new observations by combining and extending the existing ones in creative ways.\n\
         Look for connections between observations and potential implications that weren't initially obvious.\n\n\
         Here is the problem:\n{problem}\n\n\
         Here are the existing observations:\n{listed}\n\n\
         Please provide {count} new observations derived from the existing ones."
    )
}

fn solution_prompt(problem: &str, observations: &[String]) -> String {
    let insights = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| format!("Insight {}: {}", i + 1, obs))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Here is the problem to solve:\n{problem}\n\n\
         Here are the key insights to help solve the problem:\n{insights}\n\n\
         Use these insights above to develop a clear, step-by-step solution to the problem.\n\
         Think creatively and go beyond conventional approaches, while ensuring your solution is logical and well-supported.\n\
         Quote relevant insights EXACTLY before each step to show how they inform your solution. QUOTING IS CRUCIAL."
    )
}

fn implementation_prompt(problem: &str, solution: &str) -> String {
    format!(
        "You are an expert problem solver. You will be given a problem and a detailed solution approach.\n\
         Transform this solution into a concrete implementation that solves the problem.\n\
         Your implementation should closely follow the solution's logic while being efficient and practical.\n\n\
         Problem:\n{problem}\n\n\
         Solution Approach:\n{solution}\n\n\
         Please implement the solution."
    )
}

/// The plan-search pipeline
pub struct PlanSearch {
    service: Arc<dyn CompletionService>,
    model: String,
    system_prompt: String,
    config: PlanSearchConfig,
}

impl PlanSearch {
    pub fn new(
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        config: PlanSearchConfig,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            system_prompt: system_prompt.into(),
            config,
        }
    }

    pub fn config(&self) -> &PlanSearchConfig {
        &self.config
    }

    /// Send one stage prompt and return the trimmed reply.
    async fn ask(&self, prompt: String, usage: &mut TokenUsage) -> Result<String> {
        let conversation = Conversation::with_system_and_user(&self.system_prompt, prompt);
        let request = CompletionRequest::new(&self.model, conversation.to_messages())
            .with_max_tokens(self.config.max_tokens);
        let response = self.service.complete(&request).await?;
        usage.merge(response.usage);

        let reply = response.first_text().ok_or_else(|| ProviderError::NoChoices {
            provider: self.service.name().to_string(),
        })?;
        Ok(reply.trim().to_string())
    }

    /// Stage 1: `count` non-obvious observations about the problem
    pub async fn generate_observations(
        &self,
        problem: &str,
        count: usize,
        usage: &mut TokenUsage,
    ) -> Result<Vec<String>> {
        let reply = self.ask(observations_prompt(problem, count), usage).await?;
        Ok(parse_observations(&reply))
    }

    /// Stage 2: `count` new observations built from the existing ones
    pub async fn generate_derived_observations(
        &self,
        problem: &str,
        observations: &[String],
        count: usize,
        usage: &mut TokenUsage,
    ) -> Result<Vec<String>> {
        let reply = self
            .ask(
                derived_observations_prompt(problem, observations, count),
                usage,
            )
            .await?;
        Ok(parse_observations(&reply))
    }

    /// Stage 3: step-by-step solution quoting an insight before each step
    pub async fn generate_solution(
        &self,
        problem: &str,
        observations: &[String],
        usage: &mut TokenUsage,
    ) -> Result<String> {
        self.ask(solution_prompt(problem, observations), usage).await
    }

    /// Stage 4: concrete implementation of the solution
    pub async fn implement_solution(
        &self,
        problem: &str,
        solution: &str,
        usage: &mut TokenUsage,
    ) -> Result<String> {
        self.ask(implementation_prompt(problem, solution), usage).await
    }

    /// One full run of the pipeline
    pub async fn solve(&self, problem: &str) -> Result<PlanRun> {
        let mut usage = TokenUsage::default();
        let mut observations = ObservationSet::new();

        tracing::info!("Generating initial observations");
        let initial = self
            .generate_observations(problem, self.config.initial_observations, &mut usage)
            .await?;
        if initial.len() < self.config.initial_observations {
            tracing::debug!(
                "Model returned {} of {} requested observations",
                initial.len(),
                self.config.initial_observations
            );
        }
        observations.extend(ObservationOrigin::Initial, initial);

        tracing::info!("Generating derived observations");
        let derived = self
            .generate_derived_observations(
                problem,
                &observations.texts(),
                self.config.derived_observations,
                &mut usage,
            )
            .await?;
        observations.extend(ObservationOrigin::Derived, derived);

        tracing::info!("Generating solution based on observations");
        let solution = self
            .generate_solution(problem, &observations.texts(), &mut usage)
            .await?;

        tracing::info!("Implementing solution");
        let implementation = self
            .implement_solution(problem, &solution, &mut usage)
            .await?;

        Ok(PlanRun {
            observations,
            artifact: SolutionArtifact {
                solution,
                implementation,
            },
            usage,
        })
    }

    /// `n` independent runs, in run order
    pub async fn solve_runs(&self, problem: &str, n: u32) -> Result<Vec<PlanRun>> {
        if self.config.concurrent_runs {
            tracing::info!("plansearch: {} concurrent runs", n);
            return try_join_all((0..n).map(|_| self.solve(problem))).await;
        }

        tracing::info!("plansearch: {} sequential runs", n);
        let mut runs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            runs.push(self.solve(problem).await?);
        }
        Ok(runs)
    }

    /// `n` runs reduced to their implementations plus the total usage
    pub async fn solve_multiple(&self, problem: &str, n: u32) -> Result<(Vec<String>, TokenUsage)> {
        let runs = self.solve_runs(problem, n).await?;
        let total: TokenUsage = runs.iter().map(|run| run.usage).sum();
        let implementations = runs
            .into_iter()
            .map(|run| run.artifact.implementation)
            .collect();
        Ok((implementations, total))
    }
}

/// Multi-run plan search: `n` implementations plus the grand total usage.
pub async fn plansearch(
    system_prompt: &str,
    initial_query: &str,
    service: Arc<dyn CompletionService>,
    model: &str,
    n: u32,
    initial_observations: usize,
    derived_observations: usize,
) -> Result<(Vec<String>, TokenUsage)> {
    let config = PlanSearchConfig {
        n,
        initial_observations,
        derived_observations,
        ..PlanSearchConfig::default()
    };
    PlanSearch::new(service, model, system_prompt, config)
        .solve_multiple(initial_query, n)
        .await
}

/// Single-run plan search, keeping both the solution and its implementation.
pub async fn plansearch_single(
    system_prompt: &str,
    initial_query: &str,
    service: Arc<dyn CompletionService>,
    model: &str,
    initial_observations: usize,
    derived_observations: usize,
) -> Result<SolutionArtifact> {
    let config = PlanSearchConfig {
        initial_observations,
        derived_observations,
        ..PlanSearchConfig::default()
    };
    let run = PlanSearch::new(service, model, system_prompt, config)
        .solve(initial_query)
        .await?;
    Ok(run.artifact)
}
