use async_trait::async_trait;
use captionloop_agent::AgentError;

use crate::Verdict;

/// Supported evaluator types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluatorType {
    Rules,
    Llm,
}

impl std::fmt::Display for EvaluatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorType::Rules => write!(f, "rules"),
            EvaluatorType::Llm => write!(f, "llm"),
        }
    }
}

impl std::str::FromStr for EvaluatorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" | "heuristic" => Ok(EvaluatorType::Rules),
            "llm" | "model" => Ok(EvaluatorType::Llm),
            _ => Err(format!("Unknown evaluator type: {}", s)),
        }
    }
}

/// Judges candidate captions
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// The evaluator type
    fn evaluator_type(&self) -> EvaluatorType;

    /// Produce a fresh verdict for the candidate
    async fn evaluate(&self, candidate: &str) -> Result<Verdict, EvaluationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Agent execution error: {0}")]
    AgentError(#[from] AgentError),

    #[error("{0} returned an empty verdict")]
    EmptyResponse(String),
}
