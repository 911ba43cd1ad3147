use async_trait::async_trait;
use tracing::debug;

use crate::caption::normalize_whitespace;
use crate::{
    AgentError, CaptionBrief, ChatModel, Generator, GeneratorPrompts, GeneratorType,
    DEFAULT_MAX_WORDS,
};

/// Generator backed by a chat model
pub struct LlmGenerator {
    brief: CaptionBrief,
    max_words: usize,
    model: Box<dyn ChatModel>,
}

impl LlmGenerator {
    pub fn new(brief: CaptionBrief, model: Box<dyn ChatModel>) -> Self {
        Self {
            brief,
            max_words: DEFAULT_MAX_WORDS,
            model,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }
}

/// Trim, drop wrapping quotes, collapse whitespace
fn clean_caption(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'');
    normalize_whitespace(trimmed)
}

#[async_trait]
impl Generator for LlmGenerator {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn generator_type(&self) -> GeneratorType {
        GeneratorType::Llm
    }

    async fn propose(&self, feedback: Option<&str>) -> Result<String, AgentError> {
        let system = GeneratorPrompts::build_system_prompt(self.max_words);
        let request = GeneratorPrompts::build_request(&self.brief, feedback);

        let raw = self.model.complete(&system, &request).await?;
        let caption = clean_caption(&raw);
        debug!(raw_len = raw.len(), caption = %caption, "Model proposed caption");

        if caption.is_empty() {
            return Err(AgentError::EmptyResponse(self.model.name().to_string()));
        }
        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed string and records each request
    struct CannedChat {
        reply: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatModel for CannedChat {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _system: &str, message: &str) -> Result<String, AgentError> {
            self.requests.lock().unwrap().push(message.to_string());
            Ok(self.reply.clone())
        }
    }

    fn generator(reply: &str) -> (LlmGenerator, Arc<Mutex<Vec<String>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let chat = CannedChat {
            reply: reply.to_string(),
            requests: requests.clone(),
        };
        (
            LlmGenerator::new(CaptionBrief::new("Neon", "Gamers"), Box::new(chat)),
            requests,
        )
    }

    #[test]
    fn test_clean_caption() {
        assert_eq!(clean_caption("  \"Neon   power ⚡\"\n"), "Neon power ⚡");
        assert_eq!(clean_caption("'Neon rocks'"), "Neon rocks");
    }

    #[tokio::test]
    async fn test_propose_cleans_reply() {
        let (generator, _) = generator("\"Level up with Neon ⚡\"");
        let caption = generator.propose(None).await.unwrap();
        assert_eq!(caption, "Level up with Neon ⚡");
    }

    #[tokio::test]
    async fn test_propose_forwards_feedback() {
        let (generator, requests) = generator("Neon ⚡");
        generator.propose(Some("Must contain an emoji.")).await.unwrap();
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("Feedback: Must contain an emoji."));
    }

    #[tokio::test]
    async fn test_blank_reply_fails_loudly() {
        let (generator, _) = generator("  \"\"  ");
        let err = generator.propose(None).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse(_)));
    }
}
