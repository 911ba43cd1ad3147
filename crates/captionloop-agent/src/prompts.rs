use crate::{CaptionBrief, BLOCKED_TERMS};

/// Prompt templates for the model-backed generator
pub struct GeneratorPrompts;

impl GeneratorPrompts {
    pub fn build_system_prompt(max_words: usize) -> String {
        format!(
            r#"You are an ad copywriter. Generate ONE short caption that:
- Mentions the product name exactly as given.
- Is {max_words} words or fewer.
- Includes at least one emoji.
- Avoids blocked terms: {blocked}.
- Tone: energetic, concise."#,
            max_words = max_words,
            blocked = BLOCKED_TERMS.join(", "),
        )
    }

    /// Build the per-attempt request; feedback is the previous rejection, if any
    pub fn build_request(brief: &CaptionBrief, feedback: Option<&str>) -> String {
        format!(
            "Product: {product}\nAudience: {audience}\nFeedback: {feedback}\nReturn only the caption.",
            product = brief.product,
            audience = brief.audience,
            feedback = feedback.unwrap_or("No prior feedback; follow the rules."),
        )
    }
}
