// CLI argument definitions

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::config::Config;
use crate::strategies::Approach;

#[derive(Debug, Parser)]
#[command(name = "ponder")]
#[command(about = "Inference-time compute strategies over completion APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: ~/.ponder/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one strategy on a query
    Run(RunArgs),

    /// List available approaches
    Approaches,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Strategy to run: bon, plansearch or re2
    pub approach: Approach,

    /// The query or problem statement ("-" reads stdin)
    pub query: String,

    /// System prompt (overrides config)
    #[arg(short, long)]
    pub system: Option<String>,

    /// Model identifier (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sample count: candidates for bon, runs for plansearch, completions for re2
    #[arg(short, long)]
    pub n: Option<u32>,

    /// Plan search: initial observations per run
    #[arg(long)]
    pub initial_observations: Option<usize>,

    /// Plan search: derived observations per run
    #[arg(long)]
    pub derived_observations: Option<usize>,

    /// Plan search: drive runs concurrently
    #[arg(long)]
    pub concurrent: bool,
}

impl RunArgs {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(n) = self.n {
            match self.approach {
                Approach::BestOfN => config.best_of_n.n = n,
                Approach::PlanSearch => config.plansearch.n = n,
                Approach::Reread => config.reread.n = n,
            }
        }
        if let Some(k) = self.initial_observations {
            config.plansearch.initial_observations = k;
        }
        if let Some(k) = self.derived_observations {
            config.plansearch.derived_observations = k;
        }
        if self.concurrent {
            config.plansearch.concurrent_runs = true;
        }
    }

    /// System prompt from the flag, else from config
    pub fn system_prompt<'a>(&'a self, config: &'a Config) -> &'a str {
        self.system.as_deref().unwrap_or(&config.system_prompt)
    }

    /// The query text, reading stdin for "-"
    pub fn read_query(&self) -> Result<String> {
        if self.query != "-" {
            return Ok(self.query.clone());
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read query from stdin")?;
        Ok(buf)
    }
}
