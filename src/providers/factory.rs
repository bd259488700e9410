// Service factory
//
// Creates completion services from configuration

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use super::openai::OpenAIService;
use super::CompletionService;
use crate::config::{Config, ProviderEntry};

/// Build the configured completion service, applying timeout and retry settings.
pub fn create_service(config: &Config) -> Result<Arc<dyn CompletionService>> {
    let service = create_service_from_entry(&config.provider)?
        .with_timeout(Duration::from_secs(config.request_timeout_secs))?
        .with_max_retries(config.max_retries);

    tracing::debug!(
        "Created {} completion service at {}",
        config.provider.provider_type(),
        service.base_url()
    );

    Ok(Arc::new(service))
}

/// Create an OpenAI-compatible service from a single provider entry.
pub fn create_service_from_entry(entry: &ProviderEntry) -> Result<OpenAIService> {
    match entry {
        ProviderEntry::Openai { api_key, base_url } => {
            let service = OpenAIService::new_openai(api_key.clone())?;
            Ok(match base_url {
                Some(url) => service.with_base_url(url.clone()),
                None => service,
            })
        }

        ProviderEntry::Grok { api_key } => OpenAIService::new_grok(api_key.clone()),

        ProviderEntry::Mistral { api_key, base_url } => {
            let service = OpenAIService::new_mistral(api_key.clone())?;
            Ok(match base_url {
                Some(url) => service.with_base_url(url.clone()),
                None => service,
            })
        }

        ProviderEntry::Groq { api_key } => OpenAIService::new_groq(api_key.clone()),

        ProviderEntry::Custom { base_url, api_key } => {
            OpenAIService::new_custom(base_url.clone(), api_key.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_with_base_url_override() {
        let entry = ProviderEntry::Openai {
            api_key: "sk-test".to_string(),
            base_url: Some("https://proxy.example.com/".to_string()),
        };
        let service = create_service_from_entry(&entry).unwrap();
        assert_eq!(service.name(), "openai");
        assert_eq!(service.base_url(), "https://proxy.example.com");
    }

    #[test]
    fn test_create_each_provider() {
        let entries = vec![
            (ProviderEntry::Grok { api_key: "k".to_string() }, "grok"),
            (
                ProviderEntry::Mistral {
                    api_key: "k".to_string(),
                    base_url: None,
                },
                "mistral",
            ),
            (ProviderEntry::Groq { api_key: "k".to_string() }, "groq"),
            (
                ProviderEntry::Custom {
                    base_url: "http://localhost:1234".to_string(),
                    api_key: None,
                },
                "custom",
            ),
        ];
        for (entry, name) in entries {
            let service = create_service_from_entry(&entry).unwrap();
            assert_eq!(service.name(), name);
        }
    }

    #[test]
    fn test_create_service_from_config() {
        let config = Config::with_provider(ProviderEntry::Custom {
            base_url: "http://localhost:1234".to_string(),
            api_key: None,
        });
        let service = create_service(&config).unwrap();
        assert_eq!(service.name(), "custom");
    }
}
