use async_trait::async_trait;
use thiserror::Error;

use crate::ConfigError;

/// Errors that can occur while producing a candidate caption
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Supported generator types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorType {
    Template,
    Llm,
}

impl std::fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorType::Template => write!(f, "template"),
            GeneratorType::Llm => write!(f, "llm"),
        }
    }
}

impl std::str::FromStr for GeneratorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "template" | "templates" => Ok(GeneratorType::Template),
            "llm" | "model" => Ok(GeneratorType::Llm),
            _ => Err(format!("Unknown generator type: {}", s)),
        }
    }
}

/// Proposes candidate captions, optionally steered by the last rejection
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name (e.g., "Template", "Ollama llama3:8b")
    fn name(&self) -> &str;

    /// The generator type
    fn generator_type(&self) -> GeneratorType;

    /// Produce the next candidate.
    ///
    /// `feedback` is `None` on the first call of a run and the previous
    /// verdict's reasons afterwards. Failing to produce text is an error,
    /// never an empty string.
    async fn propose(&self, feedback: Option<&str>) -> Result<String, AgentError>;
}
