use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::{AgentError, OllamaChat, OpenAiChat};

pub const DEFAULT_MODEL: &str = "llama3:8b";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Invalid provider/model settings, detected before any loop iteration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error(
        "provider=openai but model '{model}' looks like an Ollama tag (e.g. llama3:8b). \
         Use an OpenAI model name (e.g. gpt-4o-mini)."
    )]
    ModelProviderMismatch { model: String },

    #[error("provider=openai requires an API key (--api-key or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("temperature {0} is outside 0.0..=2.0")]
    InvalidTemperature(f64),
}

/// Chat model backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    #[default]
    Ollama,
    OpenAi,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" | "open-ai" => Ok(Provider::OpenAi),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// A single-turn chat completion backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable name, e.g. "ollama/llama3:8b"
    fn name(&self) -> &str;

    /// Send one system + user exchange and return the reply text
    async fn complete(&self, system_prompt: &str, message: &str) -> Result<String, AgentError>;
}

/// Settings needed to construct a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub ollama_base_url: String,
    /// Override for OpenAI-compatible proxies
    pub openai_base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            openai_base_url: None,
            api_key: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_ollama_base_url(mut self, url: String) -> Self {
        self.ollama_base_url = url;
        self
    }

    pub fn with_openai_base_url(mut self, url: String) -> Self {
        self.openai_base_url = Some(url);
        self
    }

    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Reject settings that cannot work, before anything is sent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if self.provider == Provider::OpenAi {
            if self.model.contains(':') {
                return Err(ConfigError::ModelProviderMismatch {
                    model: self.model.clone(),
                });
            }
            if self.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingApiKey);
            }
        }

        Ok(())
    }
}

/// Validate the config and build the matching chat model
pub fn create_chat_model(config: &ProviderConfig) -> Result<Box<dyn ChatModel>, ConfigError> {
    config.validate()?;

    debug!(
        provider = %config.provider,
        model = %config.model,
        temperature = config.temperature,
        "Creating chat model"
    );

    let model: Box<dyn ChatModel> = match config.provider {
        Provider::Ollama => Box::new(OllamaChat::new(
            &config.ollama_base_url,
            &config.model,
            config.temperature,
        )),
        Provider::OpenAi => Box::new(OpenAiChat::new(
            config
                .openai_base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_BASE_URL),
            &config.model,
            config.temperature,
            config.api_key.as_deref(),
        )),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProviderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_openai_rejects_ollama_tag() {
        let config = ProviderConfig::new(Provider::OpenAi, "llama3:8b").with_api_key("sk".into());
        assert_eq!(
            config.validate(),
            Err(ConfigError::ModelProviderMismatch {
                model: "llama3:8b".into()
            })
        );
    }

    #[test]
    fn test_ollama_accepts_tagged_model() {
        let config = ProviderConfig::new(Provider::Ollama, "llama3:8b");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = ProviderConfig::new(Provider::OpenAi, "gpt-4o-mini");
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));

        let config = config.with_api_key(String::new());
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn test_temperature_range() {
        let config = ProviderConfig::default().with_temperature(2.5);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTemperature(2.5)));
        assert!(ProviderConfig::default()
            .with_temperature(0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_create_chat_model_fails_eagerly() {
        let config = ProviderConfig::new(Provider::OpenAi, "llama3:8b").with_api_key("sk".into());
        assert!(create_chat_model(&config).is_err());
    }

    #[test]
    fn test_create_chat_model_names_backend() {
        let model = create_chat_model(&ProviderConfig::default()).unwrap();
        assert_eq!(model.name(), "ollama/llama3:8b");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::OpenAi));
        assert_eq!("ollama".parse::<Provider>(), Ok(Provider::Ollama));
        assert!("bedrock".parse::<Provider>().is_err());
    }
}
