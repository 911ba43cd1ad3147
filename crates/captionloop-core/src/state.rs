use captionloop_critic::verdict::{EXHAUSTED, STATUS, STATUS_REJECTED};
use captionloop_critic::{Attributes, Verdict};
use serde::Serialize;

/// One loop iteration: the candidate and the verdict it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub candidate: String,
    pub verdict: Verdict,
}

/// Where the loop goes after an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Accepted or exhausted; nothing more runs
    Done,
    /// Generate again with the latest feedback
    Retry,
}

/// Working state of one run.
///
/// Each transition consumes the state and returns the next one. History is
/// append-only and `accepted`/`exhausted` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopState {
    candidate: String,
    feedback: Option<String>,
    accepted: bool,
    history: Vec<Attempt>,
    attributes: Attributes,
    exhausted: bool,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// Feedback for the next generation; `None` before the first evaluation
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn history(&self) -> &[Attempt] {
        &self.history
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_terminal(&self) -> bool {
        self.accepted || self.exhausted
    }

    /// Generate step: adopt the new candidate, nothing else changes
    pub fn with_candidate(self, candidate: String) -> Self {
        if self.is_terminal() {
            return self;
        }
        Self { candidate, ..self }
    }

    /// Evaluate step: record the attempt and apply the budget policy.
    ///
    /// A rejection that brings the history to `max_attempts` or beyond
    /// exhausts the run. With a budget of 0 the first rejection exhausts it.
    pub fn record_verdict(self, verdict: Verdict, max_attempts: usize) -> Self {
        if self.is_terminal() {
            return self;
        }

        let mut history = self.history;
        history.push(Attempt {
            candidate: self.candidate.clone(),
            verdict: verdict.clone(),
        });

        let would_exhaust = history.len() >= max_attempts && !verdict.accepted();

        let next = if would_exhaust {
            let mut attributes = verdict.attributes().clone();
            attributes.insert(STATUS.to_string(), STATUS_REJECTED.to_string());
            attributes.insert(EXHAUSTED.to_string(), "true".to_string());
            Self {
                candidate: self.candidate,
                feedback: Some(exhaustion_feedback(max_attempts, verdict.reasons())),
                accepted: false,
                history,
                attributes,
                exhausted: true,
            }
        } else {
            Self {
                candidate: self.candidate,
                feedback: Some(verdict.reasons().to_string()),
                accepted: verdict.accepted(),
                history,
                attributes: verdict.attributes().clone(),
                exhausted: false,
            }
        };

        debug_assert!(!(next.accepted && next.exhausted));
        next
    }

    pub fn route(&self) -> Route {
        if self.is_terminal() {
            Route::Done
        } else {
            Route::Retry
        }
    }
}

/// Feedback recorded when the budget runs out
pub fn exhaustion_feedback(max_attempts: usize, last_reasons: &str) -> String {
    format!(
        "Attempt budget exhausted after {} tries. Last feedback: {}",
        max_attempts, last_reasons
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use captionloop_critic::verdict::STATUS_APPROVED;

    fn rejected(reasons: &str) -> Verdict {
        Verdict::rejected(reasons, Attributes::new())
    }

    fn approved() -> Verdict {
        Verdict::approved("Approved", Attributes::new())
    }

    #[test]
    fn test_initial_state() {
        let state = LoopState::new();
        assert_eq!(state.candidate(), "");
        assert_eq!(state.feedback(), None);
        assert!(!state.accepted());
        assert!(!state.exhausted());
        assert!(state.history().is_empty());
        assert!(state.attributes().is_empty());
        assert_eq!(state.route(), Route::Retry);
    }

    #[test]
    fn test_with_candidate_only_sets_candidate() {
        let state = LoopState::new()
            .with_candidate("a".into())
            .record_verdict(rejected("no"), 5);
        let next = state.clone().with_candidate("b".into());

        assert_eq!(next.candidate(), "b");
        assert_eq!(next.feedback(), state.feedback());
        assert_eq!(next.history(), state.history());
        assert_eq!(next.attributes(), state.attributes());
    }

    #[test]
    fn test_rejection_within_budget_retries() {
        let state = LoopState::new()
            .with_candidate("bad".into())
            .record_verdict(rejected("Needs keyword"), 3);

        assert_eq!(state.history().len(), 1);
        assert_eq!(state.feedback(), Some("Needs keyword"));
        assert!(!state.accepted());
        assert!(!state.exhausted());
        assert_eq!(state.attributes()[STATUS], STATUS_REJECTED);
        assert_eq!(state.route(), Route::Retry);
    }

    #[test]
    fn test_acceptance_is_terminal() {
        let state = LoopState::new()
            .with_candidate("ok".into())
            .record_verdict(approved(), 3);

        assert!(state.accepted());
        assert!(!state.exhausted());
        assert_eq!(state.feedback(), Some("Approved"));
        assert_eq!(state.attributes()[STATUS], STATUS_APPROVED);
        assert_eq!(state.route(), Route::Done);
    }

    #[test]
    fn test_zero_budget_exhausts_on_first_rejection() {
        let state = LoopState::new()
            .with_candidate("bad caption".into())
            .record_verdict(rejected("Always reject"), 0);

        assert!(state.exhausted());
        assert!(!state.accepted());
        assert_eq!(state.history().len(), 1);
        assert_eq!(
            state.feedback(),
            Some("Attempt budget exhausted after 0 tries. Last feedback: Always reject")
        );
        assert_eq!(state.attributes()[STATUS], STATUS_REJECTED);
        assert_eq!(state.attributes()[EXHAUSTED], "true");
    }

    #[test]
    fn test_zero_budget_still_accepts_first_approval() {
        let state = LoopState::new()
            .with_candidate("ok".into())
            .record_verdict(approved(), 0);
        assert!(state.accepted());
        assert!(!state.exhausted());
    }

    #[test]
    fn test_exhaustion_merges_verdict_attributes() {
        let mut attrs = Attributes::new();
        attrs.insert("brand_safety_check".into(), "failed".into());
        let verdict = Verdict::rejected("bad", attrs);

        let state = LoopState::new()
            .with_candidate("x".into())
            .record_verdict(verdict, 1);

        assert!(state.exhausted());
        assert_eq!(state.attributes()["brand_safety_check"], "failed");
        assert_eq!(state.attributes()[EXHAUSTED], "true");
    }

    #[test]
    fn test_terminal_state_ignores_transitions() {
        let done = LoopState::new()
            .with_candidate("x".into())
            .record_verdict(rejected("no"), 0);

        let again = done
            .clone()
            .with_candidate("y".into())
            .record_verdict(approved(), 0);
        assert_eq!(again, done);
    }
}
