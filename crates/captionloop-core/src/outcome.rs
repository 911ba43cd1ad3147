use captionloop_critic::Attributes;
use serde::Serialize;
use std::time::Duration;

use crate::{Attempt, LoopState};

/// The final outcome of a propose/evaluate run
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// A candidate was approved
    Accepted {
        attempts: usize,
        candidate: String,
        #[serde(skip)]
        state: LoopState,
        total_duration_secs: f64,
    },
    /// The attempt budget ran out without an approval
    Exhausted {
        attempts: usize,
        max_attempts: usize,
        feedback: String,
        #[serde(skip)]
        state: LoopState,
        total_duration_secs: f64,
    },
}

impl LoopOutcome {
    /// Wrap a terminal state. Callers only pass states whose route is `Done`.
    pub(crate) fn from_state(state: LoopState, max_attempts: usize, duration: Duration) -> Self {
        let attempts = state.history().len();
        let total_duration_secs = duration.as_secs_f64();

        if state.accepted() {
            Self::Accepted {
                attempts,
                candidate: state.candidate().to_string(),
                state,
                total_duration_secs,
            }
        } else {
            Self::Exhausted {
                attempts,
                max_attempts,
                feedback: state.feedback().unwrap_or_default().to_string(),
                state,
                total_duration_secs,
            }
        }
    }

    pub fn state(&self) -> &LoopState {
        match self {
            Self::Accepted { state, .. } => state,
            Self::Exhausted { state, .. } => state,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            Self::Accepted { attempts, .. } => *attempts,
            Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn history(&self) -> &[Attempt] {
        self.state().history()
    }

    /// The last candidate, approved or not
    pub fn candidate(&self) -> &str {
        self.state().candidate()
    }

    pub fn attributes(&self) -> &Attributes {
        self.state().attributes()
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Accepted { .. } => 0,
            Self::Exhausted { .. } => 1,
        }
    }
}
