// Inference-time compute strategies
//
// Each strategy turns one query into several structured completion calls and
// combines the results:
//
// - `best_of_n`: sample N candidates and keep the best-rated one
// - `plansearch`: observe → derive → synthesize → implement, N times
// - `reread`: restate the question (RE2) in a single call
//
// Strategies never call each other; `run_approach` picks one by slug.

use anyhow::Result;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::providers::CompletionService;
use crate::usage::TokenUsage;

pub mod best_of_n;
pub mod plansearch;
pub mod reread;

pub use best_of_n::{best_of_n_sampling, BestOfN, BestOfNConfig, Selection};
pub use plansearch::{
    parse_observations, plansearch, plansearch_single, Observation, ObservationOrigin,
    ObservationSet, PlanRun, PlanSearch, PlanSearchConfig, SolutionArtifact,
};
pub use reread::{re2_approach, re2_prompt, Reread, RereadConfig, RereadOutput};

/// Strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    BestOfN,
    PlanSearch,
    Reread,
}

impl Approach {
    pub const ALL: [Approach; 3] = [Approach::BestOfN, Approach::PlanSearch, Approach::Reread];

    /// Canonical slug
    pub fn slug(&self) -> &'static str {
        match self {
            Approach::BestOfN => "bon",
            Approach::PlanSearch => "plansearch",
            Approach::Reread => "re2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Approach::BestOfN => "Sample N candidates, rate each with a judge call, return the best",
            Approach::PlanSearch => {
                "Observations, derived observations, solution and implementation, repeated N times"
            }
            Approach::Reread => "Restate the question before answering (RE2)",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bon" | "best_of_n" | "best-of-n" => Ok(Approach::BestOfN),
            "plansearch" | "plan_search" | "plan-search" => Ok(Approach::PlanSearch),
            "re2" | "reread" => Ok(Approach::Reread),
            other => Err(format!(
                "unknown approach '{}' (expected one of: bon, plansearch, re2)",
                other
            )),
        }
    }
}

/// Result of whichever strategy ran
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "approach", rename_all = "snake_case")]
pub enum ApproachOutput {
    BestOfN {
        response: String,
        usage: TokenUsage,
    },
    PlanSearch {
        implementations: Vec<String>,
        usage: TokenUsage,
    },
    Reread {
        output: RereadOutput,
        usage: TokenUsage,
    },
}

impl ApproachOutput {
    pub fn usage(&self) -> TokenUsage {
        match self {
            ApproachOutput::BestOfN { usage, .. }
            | ApproachOutput::PlanSearch { usage, .. }
            | ApproachOutput::Reread { usage, .. } => *usage,
        }
    }

    /// Every response text, in the order the strategy produced them
    pub fn responses(&self) -> Vec<&str> {
        match self {
            ApproachOutput::BestOfN { response, .. } => vec![response.as_str()],
            ApproachOutput::PlanSearch {
                implementations, ..
            } => implementations.iter().map(String::as_str).collect(),
            ApproachOutput::Reread { output, .. } => output.texts(),
        }
    }
}

/// Run `approach` with the strategy settings from `config`.
pub async fn run_approach(
    approach: Approach,
    service: Arc<dyn CompletionService>,
    config: &Config,
    system_prompt: &str,
    query: &str,
) -> Result<ApproachOutput> {
    tracing::info!(
        approach = %approach,
        model = %config.model,
        service = service.name(),
        "Running approach"
    );

    match approach {
        Approach::BestOfN => {
            let selection = BestOfN::new(service, &config.model, config.best_of_n.clone())
                .run(system_prompt, query)
                .await?;
            let (response, usage) = selection.into_best();
            Ok(ApproachOutput::BestOfN { response, usage })
        }
        Approach::PlanSearch => {
            let planner = PlanSearch::new(
                service,
                &config.model,
                system_prompt,
                config.plansearch.clone(),
            );
            let (implementations, usage) =
                planner.solve_multiple(query, config.plansearch.n).await?;
            Ok(ApproachOutput::PlanSearch {
                implementations,
                usage,
            })
        }
        Approach::Reread => {
            let (output, usage) = Reread::new(service, &config.model, config.reread.clone())
                .run(system_prompt, query)
                .await?;
            Ok(ApproachOutput::Reread { output, usage })
        }
    }
}
