use captionloop_adcp::{AttemptLog, FinalPayload, SchemaError};
use captionloop_core::{Attempt, LoopState};
use captionloop_critic::{Attributes, RuleEvaluator, Verdict};

fn attempt(candidate: &str, verdict: Verdict) -> Attempt {
    Attempt {
        candidate: candidate.to_string(),
        verdict,
    }
}

/// Drive the state transitions directly with the rule evaluator
fn rule_based_run(captions: &[&str], max_attempts: usize) -> LoopState {
    let evaluator = RuleEvaluator::new("Prod").with_max_words(10);
    let mut state = LoopState::new();
    for caption in captions {
        if state.is_terminal() {
            break;
        }
        state = state.with_candidate(caption.to_string());
        let verdict = evaluator.judge(state.candidate());
        state = state.record_verdict(verdict, max_attempts);
    }
    state
}

#[test]
fn test_attempt_log_from_run() {
    let state = rule_based_run(&["Prod rocks", "Prod rocks ⚡"], 5);
    assert!(state.accepted());

    let log = AttemptLog::from_history(state.history());
    let json = log.to_validated_json().unwrap();

    assert_eq!(json["adcp_version"], "1.0");
    assert_eq!(json["task"], "creative_generation_log");
    let attempts = json["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);

    assert_eq!(attempts[0]["sequence"], 1);
    assert_eq!(attempts[0]["type"], "text_ad");
    assert_eq!(attempts[0]["content"], "Prod rocks");
    assert_eq!(attempts[0]["status"], "rejected");
    assert_eq!(attempts[0]["feedback"], "Must contain an emoji.");

    assert_eq!(attempts[1]["sequence"], 2);
    assert_eq!(attempts[1]["status"], "approved");
    assert_eq!(attempts[1]["feedback"], "Approved");
}

#[test]
fn test_attempt_log_round_trips() {
    let history = vec![
        attempt("one", Verdict::rejected("Needs keyword", Attributes::new())),
        attempt("two ok", Verdict::approved("Approved", Attributes::new())),
    ];
    let log = AttemptLog::from_history(&history);

    let json = log.to_validated_json().unwrap();
    let back = AttemptLog::from_json(json).unwrap();
    assert_eq!(back, log);
}

#[test]
fn test_final_payload_for_accepted_caption() {
    let state = rule_based_run(&["Prod rocks ⚡"], 5);
    let payload = FinalPayload::build("Prod", "QA", state.candidate(), state.attributes()).unwrap();
    let json = payload.to_validated_json().unwrap();

    assert_eq!(json["payload"]["product"], "Prod");
    assert_eq!(json["payload"]["target_audience"], "QA");
    assert_eq!(json["payload"]["creative_assets"][0]["content"], "Prod rocks ⚡");
    assert_eq!(json["metadata"]["length"], 12);
    assert_eq!(json["metadata"]["word_count"], 3);
    assert_eq!(json["metadata"]["brand_safety_check"], "passed");

    let back = FinalPayload::from_json(json).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn test_final_payload_for_exhausted_run() {
    let state = rule_based_run(&["Prod rocks"], 0);
    assert!(state.exhausted());

    let payload = FinalPayload::build("Prod", "QA", state.candidate(), state.attributes()).unwrap();
    let json = payload.to_validated_json().unwrap();

    assert_eq!(json["payload"]["creative_assets"][0]["content"], "Prod rocks");
    assert_eq!(json["metadata"]["length"], 10);
    assert_eq!(json["metadata"]["word_count"], 2);
    assert_eq!(json["metadata"]["brand_safety_check"], "unknown");
}

#[test]
fn test_from_json_rejects_bad_shape() {
    let bad = serde_json::json!({
        "adcp_version": "1.0",
        "task": "creative_generation",
        "payload": {"target_audience": "QA", "creative_assets": [], "product": "Prod"},
        "metadata": {"length": 1, "word_count": 1, "sentiment": "energetic", "brand_safety_check": "passed"}
    });
    assert!(matches!(
        FinalPayload::from_json(bad),
        Err(SchemaError::UnexpectedValue { .. })
    ));
}
