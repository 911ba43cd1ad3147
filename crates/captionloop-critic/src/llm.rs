use async_trait::async_trait;
use captionloop_agent::caption::{char_length, word_count};
use captionloop_agent::{ChatModel, DEFAULT_MAX_WORDS};
use tracing::{debug, info};

use crate::verdict::{
    Attributes, BRAND_SAFETY_CHECK, BRAND_SAFETY_FAILED, BRAND_SAFETY_PASSED, LENGTH, WORD_COUNT,
};
use crate::{CriticPrompts, EvaluationError, Evaluator, EvaluatorType, Verdict};

/// Evaluator backed by a chat model that answers `APPROVED` or
/// `REJECTED: <feedback>`
pub struct LlmEvaluator {
    product: String,
    max_words: usize,
    model: Box<dyn ChatModel>,
}

/// Decision extracted from a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDecision {
    pub approved: bool,
    pub feedback: String,
}

impl ReplyDecision {
    /// Parse the model reply.
    ///
    /// Only the first line decides: it must mention "approved" and must not
    /// mention "rejected". Returns `None` for a blank reply.
    pub fn parse(reply: &str) -> Option<Self> {
        let text = reply.trim();
        let first_line = text.lines().next()?.to_lowercase();
        let approved = first_line.contains("approved") && !first_line.contains("rejected");

        let feedback = if approved {
            "Approved".to_string()
        } else {
            let stripped = text.replace("REJECTED:", "");
            let stripped = stripped.trim();
            if stripped.is_empty() {
                "Rejected".to_string()
            } else {
                stripped.to_string()
            }
        };

        Some(Self { approved, feedback })
    }
}

impl LlmEvaluator {
    pub fn new(product: impl Into<String>, model: Box<dyn ChatModel>) -> Self {
        Self {
            product: product.into(),
            max_words: DEFAULT_MAX_WORDS,
            model,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn evaluator_type(&self) -> EvaluatorType {
        EvaluatorType::Llm
    }

    async fn evaluate(&self, candidate: &str) -> Result<Verdict, EvaluationError> {
        let system = CriticPrompts::build_system_prompt(&self.product, self.max_words);
        let request = CriticPrompts::build_evaluation_prompt(&self.product, candidate);

        debug!(candidate = %candidate, "Running model evaluation");
        let reply = self.model.complete(&system, &request).await?;

        let decision = ReplyDecision::parse(&reply)
            .ok_or_else(|| EvaluationError::EmptyResponse(self.model.name().to_string()))?;
        info!(approved = decision.approved, "Model evaluation completed");

        let mut attributes = Attributes::new();
        attributes.insert(LENGTH.to_string(), char_length(candidate).to_string());
        attributes.insert(WORD_COUNT.to_string(), word_count(candidate).to_string());
        let brand_safety = if decision.approved {
            BRAND_SAFETY_PASSED
        } else {
            BRAND_SAFETY_FAILED
        };
        attributes.insert(BRAND_SAFETY_CHECK.to_string(), brand_safety.to_string());

        Ok(if decision.approved {
            Verdict::approved(decision.feedback, attributes)
        } else {
            Verdict::rejected(decision.feedback, attributes)
        })
    }
}
