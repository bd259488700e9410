// Configuration structs

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT};
use super::provider::ProviderEntry;
use crate::strategies::{BestOfNConfig, PlanSearchConfig, RereadConfig};

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Top-level configuration (`~/.ponder/config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion backend
    pub provider: ProviderEntry,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// System prompt used when the caller does not supply one
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Transport-level retries inside the HTTP service (0 = fail fast)
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub best_of_n: BestOfNConfig,

    #[serde(default)]
    pub plansearch: PlanSearchConfig,

    #[serde(default)]
    pub reread: RereadConfig,
}

impl Config {
    /// Configuration with defaults for everything except the provider
    pub fn with_provider(provider: ProviderEntry) -> Self {
        Self {
            provider,
            model: default_model(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
            best_of_n: BestOfNConfig::default(),
            plansearch: PlanSearchConfig::default(),
            reread: RereadConfig::default(),
        }
    }

    /// Reject settings no strategy can run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.requires_api_key()
            && self.provider.api_key().map_or(true, |k| k.trim().is_empty())
        {
            bail!(
                "API key for provider '{}' is empty\n\n\
                 Update your config:\n  Edit ~/.ponder/config.toml",
                self.provider.provider_type()
            );
        }
        if self.model.trim().is_empty() {
            bail!("Model name must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        if self.best_of_n.n == 0 {
            bail!("best_of_n.n must be at least 1");
        }
        if self.plansearch.n == 0 {
            bail!("plansearch.n must be at least 1");
        }
        if self.reread.n == 0 {
            bail!("reread.n must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai(key: &str) -> ProviderEntry {
        ProviderEntry::Openai {
            api_key: key.to_string(),
            base_url: None,
        }
    }

    #[test]
    fn test_with_provider_defaults() {
        let config = Config::with_provider(openai("sk-test"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.best_of_n.n, 3);
        assert_eq!(config.plansearch.initial_observations, 3);
        assert_eq!(config.plansearch.derived_observations, 2);
        assert_eq!(config.reread.n, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = Config::with_provider(openai("  "));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_validate_allows_keyless_custom() {
        let config = Config::with_provider(ProviderEntry::Custom {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let mut config = Config::with_provider(openai("sk-test"));
        config.best_of_n.n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::with_provider(openai("sk-test"));
        config.plansearch.n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::with_provider(openai("sk-test"));
        config.reread.n = 0;
        assert!(config.validate().is_err());
    }
}
