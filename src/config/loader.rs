// Configuration loader
// Loads settings from ~/.ponder/config.toml, an explicit path, or environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR, CONFIG_FILE};
use super::provider::ProviderEntry;
use super::settings::Config;

/// `~/.ponder/config.toml`, if a home directory can be determined
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration.
///
/// Order: the explicit `path` (must exist), then `~/.ponder/config.toml`,
/// then the `OPENAI_API_KEY` / `OPENAI_BASE_URL` environment variables.
/// `PONDER_MODEL` overrides the model in every case.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_from_file(&path)?,
            None => from_env()?,
        },
    };

    if let Ok(model) = std::env::var("PONDER_MODEL") {
        if !model.trim().is_empty() {
            config.model = model;
        }
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Parse a TOML document into a [`Config`] (no validation)
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Failed to parse configuration")
}

fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    tracing::debug!("Loaded configuration from {}", path.display());
    parse_config(&contents).with_context(|| format!("Invalid config file: {}", path.display()))
}

fn from_env() -> Result<Config> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());
    let base_url = std::env::var("OPENAI_BASE_URL")
        .ok()
        .filter(|u| !u.is_empty());

    let provider = match (api_key, base_url) {
        (Some(api_key), base_url) => ProviderEntry::Openai { api_key, base_url },
        (None, Some(base_url)) => ProviderEntry::Custom {
            base_url,
            api_key: None,
        },
        (None, None) => bail!(
            "No configuration found.\n\n\
             Create ~/.ponder/config.toml:\n\n  \
             [provider]\n  type = \"openai\"\n  api_key = \"sk-...\"\n\n\
             Alternatively, set environment variable:\n\
             export OPENAI_API_KEY=\"sk-...\""
        ),
    };

    tracing::debug!("Using {} provider from environment", provider.provider_type());
    Ok(Config::with_provider(provider))
}
