//! # captionloop-agent
//!
//! The generator side of the propose/evaluate loop, plus the chat model
//! clients shared with model-backed evaluators.
//!
//! ## Key Types
//!
//! - [`Generator`] - Produces candidate captions from optional feedback
//! - [`TemplateGenerator`] - Rule-based generator over fixed templates
//! - [`LlmGenerator`] - Generator backed by a [`ChatModel`]
//! - [`ProviderConfig`] - Provider/model settings, validated up front

pub mod caption;
mod chat;
mod llm;
mod ollama;
mod openai;
mod prompts;
mod template;
mod traits;

pub use caption::{CaptionBrief, BLOCKED_TERMS, DEFAULT_MAX_WORDS};
pub use chat::{
    create_chat_model, ChatModel, ConfigError, Provider, ProviderConfig, DEFAULT_MODEL,
    DEFAULT_OLLAMA_BASE_URL, DEFAULT_OPENAI_BASE_URL, OPENAI_API_KEY_ENV,
};
pub use llm::LlmGenerator;
pub use ollama::OllamaChat;
pub use openai::OpenAiChat;
pub use prompts::GeneratorPrompts;
pub use template::TemplateGenerator;
pub use traits::{AgentError, Generator, GeneratorType};

/// Create a generator by type.
///
/// Model-backed generators validate `provider` first, so a bad
/// provider/model pairing fails here rather than mid-loop.
pub fn create_generator(
    generator_type: GeneratorType,
    brief: CaptionBrief,
    max_words: usize,
    provider: &ProviderConfig,
) -> Result<Box<dyn Generator>, ConfigError> {
    let generator: Box<dyn Generator> = match generator_type {
        GeneratorType::Template => {
            Box::new(TemplateGenerator::new(brief).with_max_words(max_words))
        }
        GeneratorType::Llm => Box::new(
            LlmGenerator::new(brief, create_chat_model(provider)?).with_max_words(max_words),
        ),
    };
    Ok(generator)
}
