use thiserror::Error;

/// Faults that abort a run. Rejections and budget exhaustion are not errors.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Generator error: {0}")]
    GeneratorError(#[from] captionloop_agent::AgentError),

    #[error("Evaluator error: {0}")]
    EvaluatorError(#[from] captionloop_critic::EvaluationError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] captionloop_agent::ConfigError),
}
