//! Project configuration file support for captionloop.
//!
//! Loads configuration from `captionloop.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Project-level configuration loaded from `captionloop.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Attempt budget
    pub max_attempts: Option<usize>,
    /// Word ceiling applied by generators and evaluators
    pub max_words: Option<usize>,
    /// Global default provider ("ollama" or "openai")
    pub provider: Option<String>,
    /// Global default model (applies to both generator and evaluator)
    pub model: Option<String>,
    /// Generator-specific configuration
    #[serde(default)]
    pub generator: RoleConfig,
    /// Evaluator-specific configuration
    #[serde(default)]
    pub evaluator: RoleConfig,
    #[serde(default)]
    pub ollama: EndpointConfig,
    #[serde(default)]
    pub openai: EndpointConfig,
}

/// Configuration for a specific role (generator or evaluator)
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// "template"/"llm" for the generator, "rules"/"llm" for the evaluator
    pub mode: Option<String>,
    /// Model to use for this role
    pub model: Option<String>,
    /// Sampling temperature (generator only; the evaluator always uses 0.0)
    pub temperature: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "captionloop.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Get the effective model for the generator role.
    /// Priority: [generator].model > global model > None
    pub fn generator_model(&self) -> Option<&str> {
        self.generator.model.as_deref().or(self.model.as_deref())
    }

    /// Get the effective model for the evaluator role.
    /// Priority: [evaluator].model > global model > None
    pub fn evaluator_model(&self) -> Option<&str> {
        self.evaluator.model.as_deref().or(self.model.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
max_attempts = 3
max_words = 12
provider = "ollama"
model = "llama3:8b"

[generator]
mode = "template"
temperature = 0.7

[evaluator]
mode = "llm"
model = "qwen2.5:7b"

[ollama]
base_url = "http://gpu-box:11434"
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.max_attempts, Some(3));
        assert_eq!(config.max_words, Some(12));
        assert_eq!(config.generator.mode.as_deref(), Some("template"));
        assert_eq!(config.generator.temperature, Some(0.7));
        assert_eq!(config.generator_model(), Some("llama3:8b"));
        assert_eq!(config.evaluator_model(), Some("qwen2.5:7b"));
        assert_eq!(config.ollama.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert!(config.openai.base_url.is_none());
    }

    #[test]
    fn test_unknown_field_is_hard_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_attemps = 3\n").unwrap();
        assert!(ProjectConfig::load(dir.path()).is_err());
    }
}
