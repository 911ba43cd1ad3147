use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use captionloop_agent::Generator;
use captionloop_critic::Evaluator;
use captionloop_logging::{AgentRole, LogEvent, Logger};

use crate::error::LoopError;
use crate::outcome::LoopOutcome;
use crate::state::{LoopState, Route};

/// Orchestrates the propose/evaluate loop.
///
/// Capability calls are awaited one at a time. A failing generator or
/// evaluator aborts the run with the error; it is never recorded as a
/// rejection.
pub struct LoopRunner<'a> {
    generator: &'a dyn Generator,
    evaluator: &'a dyn Evaluator,
    max_attempts: usize,
    logger: Arc<Logger>,
}

impl<'a> LoopRunner<'a> {
    pub fn new(
        generator: &'a dyn Generator,
        evaluator: &'a dyn Evaluator,
        max_attempts: usize,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            generator,
            evaluator,
            max_attempts,
            logger,
        }
    }

    /// Run from a fresh state until accepted or exhausted
    pub async fn run(&self) -> Result<LoopOutcome, LoopError> {
        self.run_from(LoopState::new()).await
    }

    /// Run from the given state until it is terminal
    pub async fn run_from(&self, mut state: LoopState) -> Result<LoopOutcome, LoopError> {
        let started_at = Instant::now();

        loop {
            state = self.step(state).await?;
            match state.route() {
                Route::Retry => {
                    info!(
                        attempts = state.history().len(),
                        "Candidate rejected, retrying"
                    );
                }
                Route::Done => break,
            }
        }

        let duration = started_at.elapsed();
        if state.accepted() {
            self.logger.log(&LogEvent::LoopAccepted {
                attempts: state.history().len(),
                candidate: state.candidate().to_string(),
                duration_secs: duration.as_secs_f64(),
            });
        } else {
            self.logger.log(&LogEvent::BudgetExhausted {
                attempts: state.history().len(),
                max_attempts: self.max_attempts,
            });
        }

        Ok(LoopOutcome::from_state(state, self.max_attempts, duration))
    }

    /// One generate + evaluate pair. A terminal state is returned unchanged.
    pub async fn step(&self, state: LoopState) -> Result<LoopState, LoopError> {
        if state.is_terminal() {
            return Ok(state);
        }

        let attempt = state.history().len();

        self.logger.log(&LogEvent::GeneratorStarted {
            attempt,
            feedback: state.feedback().map(String::from),
        });
        debug!(attempt, generator = self.generator.name(), "Running generator");

        let candidate = match self.generator.propose(state.feedback()).await {
            Ok(candidate) => candidate,
            Err(e) => {
                self.log_error(attempt, AgentRole::Generator, &e);
                return Err(e.into());
            }
        };

        self.logger.log(&LogEvent::CandidateProposed {
            attempt,
            candidate: candidate.clone(),
        });
        let state = state.with_candidate(candidate);

        self.logger.log(&LogEvent::EvaluatorStarted { attempt });
        debug!(attempt, evaluator = self.evaluator.name(), "Running evaluator");

        let verdict = match self.evaluator.evaluate(state.candidate()).await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.log_error(attempt, AgentRole::Evaluator, &e);
                return Err(e.into());
            }
        };

        self.logger.log(&LogEvent::VerdictRecorded {
            attempt,
            accepted: verdict.accepted(),
            reasons: verdict.reasons().to_string(),
        });

        Ok(state.record_verdict(verdict, self.max_attempts))
    }

    fn log_error(&self, attempt: usize, role: AgentRole, error: &dyn std::error::Error) {
        self.logger.log(&LogEvent::ErrorEncountered {
            attempt,
            role,
            error: error.to_string(),
        });
    }
}
