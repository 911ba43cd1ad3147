use async_trait::async_trait;
use captionloop_agent::caption::{char_length, contains_emoji, find_blocked_term, word_count};
use captionloop_agent::DEFAULT_MAX_WORDS;
use tracing::debug;

use crate::verdict::{
    Attributes, BRAND_SAFETY_CHECK, BRAND_SAFETY_PASSED, LENGTH, WORD_COUNT,
};
use crate::{EvaluationError, Evaluator, EvaluatorType, Verdict};

/// Acceptance rules, checked in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    HasEmoji,
    WithinWordLimit,
    MentionsProduct,
    BrandSafe,
}

const RULES: [Rule; 4] = [
    Rule::HasEmoji,
    Rule::WithinWordLimit,
    Rule::MentionsProduct,
    Rule::BrandSafe,
];

/// Deterministic evaluator applying the fixed rule set.
///
/// Every failing rule contributes its message; the messages are joined with
/// a single space in rule order.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    product: String,
    max_words: usize,
}

impl RuleEvaluator {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            max_words: DEFAULT_MAX_WORDS,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Message for a violated rule, `None` if the caption passes it
    fn violation(&self, rule: Rule, caption: &str) -> Option<String> {
        match rule {
            Rule::HasEmoji => {
                (!contains_emoji(caption)).then(|| "Must contain an emoji.".to_string())
            }
            Rule::WithinWordLimit => {
                let words = word_count(caption);
                (words > self.max_words).then(|| {
                    format!("Too long ({} words). Keep under {}.", words, self.max_words)
                })
            }
            Rule::MentionsProduct => (!caption
                .to_lowercase()
                .contains(&self.product.to_lowercase()))
            .then(|| "Please mention the product by name.".to_string()),
            Rule::BrandSafe => find_blocked_term(caption)
                .map(|_| "Contains blocked terms; rewrite for brand safety.".to_string()),
        }
    }

    /// Apply the rules synchronously
    pub fn judge(&self, caption: &str) -> Verdict {
        let failed: Vec<String> = RULES
            .iter()
            .filter_map(|rule| self.violation(*rule, caption))
            .collect();

        if !failed.is_empty() {
            debug!(failed = failed.len(), "Caption rejected by rules");
            return Verdict::rejected(failed.join(" "), Attributes::new());
        }

        let mut attributes = Attributes::new();
        attributes.insert(LENGTH.to_string(), char_length(caption).to_string());
        attributes.insert(WORD_COUNT.to_string(), word_count(caption).to_string());
        attributes.insert(
            BRAND_SAFETY_CHECK.to_string(),
            BRAND_SAFETY_PASSED.to_string(),
        );
        Verdict::approved("Approved", attributes)
    }
}

#[async_trait]
impl Evaluator for RuleEvaluator {
    fn name(&self) -> &str {
        "Rules"
    }

    fn evaluator_type(&self) -> EvaluatorType {
        EvaluatorType::Rules
    }

    async fn evaluate(&self, candidate: &str) -> Result<Verdict, EvaluationError> {
        Ok(self.judge(candidate))
    }
}
