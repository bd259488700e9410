// Provider entry: which completion backend to talk to

use serde::{Deserialize, Serialize};

/// A single completion backend.
///
/// Serializes with a `type` tag, e.g.:
/// ```toml
/// [provider]
/// type = "groq"
/// api_key = "gsk_..."
///
/// [provider]
/// type = "custom"
/// base_url = "http://localhost:8000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderEntry {
    Openai {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Grok {
        api_key: String,
    },
    Mistral {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Groq {
        api_key: String,
    },
    /// Any OpenAI-compatible server (vLLM, llama.cpp, LM Studio, a proxy)
    Custom {
        base_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

impl ProviderEntry {
    /// Short provider-type tag (e.g. "openai", "groq", "custom").
    pub fn provider_type(&self) -> &'static str {
        match self {
            Self::Openai { .. } => "openai",
            Self::Grok { .. } => "grok",
            Self::Mistral { .. } => "mistral",
            Self::Groq { .. } => "groq",
            Self::Custom { .. } => "custom",
        }
    }

    /// API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Openai { api_key, .. }
            | Self::Grok { api_key }
            | Self::Mistral { api_key, .. }
            | Self::Groq { api_key } => Some(api_key.as_str()),
            Self::Custom { api_key, .. } => api_key.as_deref(),
        }
    }

    /// True for hosted APIs that reject requests without a key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Custom { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_serde_roundtrip() {
        let entry = ProviderEntry::Openai {
            api_key: "sk-test".to_string(),
            base_url: Some("https://proxy.internal".to_string()),
        };
        let toml = toml::to_string(&entry).unwrap();
        let decoded: ProviderEntry = toml::from_str(&toml).unwrap();
        assert_eq!(entry, decoded);
    }

    #[test]
    fn test_custom_without_key() {
        let decoded: ProviderEntry =
            toml::from_str("type = \"custom\"\nbase_url = \"http://localhost:8000\"").unwrap();
        assert_eq!(decoded.provider_type(), "custom");
        assert!(decoded.api_key().is_none());
        assert!(!decoded.requires_api_key());
    }

    #[test]
    fn test_groq_tag() {
        let decoded: ProviderEntry = toml::from_str("type = \"groq\"\napi_key = \"gsk\"").unwrap();
        assert_eq!(decoded, ProviderEntry::Groq { api_key: "gsk".to_string() });
        assert_eq!(decoded.api_key(), Some("gsk"));
        assert!(decoded.requires_api_key());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<ProviderEntry, _> = toml::from_str("type = \"bogus\"\napi_key = \"k\"");
        assert!(result.is_err());
    }
}
