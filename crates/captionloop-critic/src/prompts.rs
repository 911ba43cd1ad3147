use captionloop_agent::BLOCKED_TERMS;

/// Prompt templates for the model-backed evaluator
pub struct CriticPrompts;

impl CriticPrompts {
    /// Build the evaluator system prompt
    pub fn build_system_prompt(product: &str, max_words: usize) -> String {
        format!(
            r#"You are a strict ad quality and safety checker.
- Caption must mention the product name: {product}.
- Caption must be {max_words} words or fewer.
- Caption must include at least one emoji.
- Avoid blocked terms: {blocked}.
Respond with either:
APPROVED
or
REJECTED: <concise feedback listing violated rules>"#,
            product = product,
            max_words = max_words,
            blocked = BLOCKED_TERMS.join(", "),
        )
    }

    /// Build the request for a single caption
    pub fn build_evaluation_prompt(product: &str, caption: &str) -> String {
        format!(
            "Product: {product}\nCaption: {caption}\nEvaluate now.",
            product = product,
            caption = caption,
        )
    }
}
