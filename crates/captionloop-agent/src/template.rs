use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;
use tracing::debug;

use crate::caption::{contains_emoji, normalize_whitespace};
use crate::{AgentError, CaptionBrief, Generator, GeneratorType, DEFAULT_MAX_WORDS};

const TEMPLATES: [&str; 4] = [
    "{product}: power up, {audience}! ⚡",
    "Boost with {product} for {audience} 🚀",
    "{audience}, grab {product} and win! 🏆",
    "Stay sharp with {product}, {audience}! ✨",
];

/// Rule-based generator: fills a random template, then patches its last
/// proposal according to keywords in the rejection feedback
pub struct TemplateGenerator {
    brief: CaptionBrief,
    max_words: usize,
    state: Mutex<TemplateState>,
}

struct TemplateState {
    rng: StdRng,
    last: Option<String>,
}

impl TemplateGenerator {
    pub fn new(brief: CaptionBrief) -> Self {
        Self::with_rng(brief, StdRng::from_entropy())
    }

    /// Deterministic template choice, for reproducible runs
    pub fn with_seed(brief: CaptionBrief, seed: u64) -> Self {
        Self::with_rng(brief, StdRng::seed_from_u64(seed))
    }

    fn with_rng(brief: CaptionBrief, rng: StdRng) -> Self {
        Self {
            brief,
            max_words: DEFAULT_MAX_WORDS,
            state: Mutex::new(TemplateState { rng, last: None }),
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    fn fill(&self, template: &str) -> String {
        template
            .replace("{product}", &self.brief.product)
            .replace("{audience}", &self.brief.audience)
    }

    fn apply_feedback(&self, caption: &str, feedback: &str) -> String {
        let lowered = feedback.to_lowercase();
        let mut caption = caption.to_string();

        if lowered.contains("emoji") && !contains_emoji(&caption) {
            caption.push_str(" 🔥");
        }

        if lowered.contains("too long") || lowered.contains("under") {
            caption = caption
                .split_whitespace()
                .take(self.max_words)
                .collect::<Vec<_>>()
                .join(" ");
        }

        if lowered.contains("mention the product") && !self.brief.mentions_product(&caption) {
            caption = format!("{} - {}", self.brief.product, caption.trim());
        }

        normalize_whitespace(&caption)
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "Template"
    }

    fn generator_type(&self) -> GeneratorType {
        GeneratorType::Template
    }

    async fn propose(&self, feedback: Option<&str>) -> Result<String, AgentError> {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = &mut *guard;

        let caption = match (feedback, state.last.as_deref()) {
            (Some(feedback), Some(last)) => self.apply_feedback(last, feedback),
            _ => {
                let template = TEMPLATES.choose(&mut state.rng).unwrap_or(&TEMPLATES[0]);
                self.fill(template)
            }
        };

        debug!(caption = %caption, "Template generator proposed caption");
        state.last = Some(caption.clone());
        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::word_count;

    fn brief() -> CaptionBrief {
        CaptionBrief::new("Neon Energy", "Gen-Z Gamers")
    }

    #[tokio::test]
    async fn test_first_proposal_fills_a_template() {
        let generator = TemplateGenerator::with_seed(brief(), 7);
        let caption = generator.propose(None).await.unwrap();
        assert!(caption.contains("Neon Energy"));
        assert!(caption.contains("Gen-Z Gamers"));
        assert!(contains_emoji(&caption));
        assert!(!caption.contains('{'));
    }

    #[tokio::test]
    async fn test_same_seed_same_caption() {
        let a = TemplateGenerator::with_seed(brief(), 42);
        let b = TemplateGenerator::with_seed(brief(), 42);
        assert_eq!(a.propose(None).await.unwrap(), b.propose(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_feedback_before_any_proposal_uses_template() {
        let generator = TemplateGenerator::with_seed(brief(), 1);
        let caption = generator.propose(Some("Must contain an emoji.")).await.unwrap();
        assert!(caption.contains("Neon Energy"));
    }

    #[test]
    fn test_emoji_feedback_appends_fire() {
        let generator = TemplateGenerator::with_seed(brief(), 1);
        let revised = generator.apply_feedback("Neon Energy rules", "Must contain an emoji.");
        assert_eq!(revised, "Neon Energy rules 🔥");
    }

    #[test]
    fn test_emoji_feedback_keeps_existing_emoji() {
        let generator = TemplateGenerator::with_seed(brief(), 1);
        let revised = generator.apply_feedback("Neon Energy ⚡", "Must contain an emoji.");
        assert_eq!(revised, "Neon Energy ⚡");
    }

    #[test]
    fn test_length_feedback_truncates() {
        let generator = TemplateGenerator::with_seed(brief(), 1).with_max_words(4);
        let revised = generator.apply_feedback(
            "Neon Energy is the best drink for all the gamers",
            "Too long (10 words). Keep under 4.",
        );
        assert_eq!(word_count(&revised), 4);
        assert_eq!(revised, "Neon Energy is the");
    }

    #[test]
    fn test_product_feedback_prefixes_product() {
        let generator = TemplateGenerator::with_seed(brief(), 1);
        let revised =
            generator.apply_feedback("  Power up   now ⚡ ", "Please mention the product by name.");
        assert_eq!(revised, "Neon Energy - Power up now ⚡");
    }

    #[tokio::test]
    async fn test_second_proposal_revises_the_first() {
        let generator = TemplateGenerator::with_seed(brief(), 3);
        let first = generator.propose(None).await.unwrap();
        let second = generator
            .propose(Some("Contains blocked terms; rewrite for brand safety."))
            .await
            .unwrap();
        // No keyword applies, so only whitespace normalisation happens
        assert_eq!(second, normalize_whitespace(&first));
    }
}
