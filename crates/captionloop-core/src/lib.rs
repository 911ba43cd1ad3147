mod error;
mod outcome;
mod runner;
mod settings;
mod state;

pub use error::LoopError;
pub use outcome::LoopOutcome;
pub use runner::LoopRunner;
pub use settings::{Capabilities, RunSettings, DEFAULT_MAX_ATTEMPTS};
pub use state::{exhaustion_feedback, Attempt, LoopState, Route};
