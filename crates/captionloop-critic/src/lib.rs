mod evaluator;
mod llm;
mod prompts;
mod rules;
pub mod verdict;

pub use evaluator::{EvaluationError, Evaluator, EvaluatorType};
pub use llm::{LlmEvaluator, ReplyDecision};
pub use prompts::CriticPrompts;
pub use rules::RuleEvaluator;
pub use verdict::{Attributes, Verdict};

use captionloop_agent::{create_chat_model, ConfigError, ProviderConfig};

/// Create an evaluator by type.
///
/// The model-backed evaluator always runs at temperature 0.0, whatever the
/// generator uses.
pub fn create_evaluator(
    evaluator_type: EvaluatorType,
    product: &str,
    max_words: usize,
    provider: &ProviderConfig,
) -> Result<Box<dyn Evaluator>, ConfigError> {
    let evaluator: Box<dyn Evaluator> = match evaluator_type {
        EvaluatorType::Rules => Box::new(RuleEvaluator::new(product).with_max_words(max_words)),
        EvaluatorType::Llm => {
            let provider = provider.clone().with_temperature(0.0);
            Box::new(
                LlmEvaluator::new(product, create_chat_model(&provider)?)
                    .with_max_words(max_words),
            )
        }
    };
    Ok(evaluator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use captionloop_agent::Provider;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_model_evaluator_runs_at_zero_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"options": {"temperature": 0.0}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3:8b",
                "message": {"role": "assistant", "content": "APPROVED"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ProviderConfig::new(Provider::Ollama, "llama3:8b")
            .with_temperature(0.9)
            .with_ollama_base_url(server.uri());
        let evaluator = create_evaluator(EvaluatorType::Llm, "Prod", 15, &provider).unwrap();

        let verdict = evaluator.evaluate("Prod rocks ⚡").await.unwrap();
        assert!(verdict.accepted());
    }

    #[test]
    fn test_rule_evaluator_from_factory() {
        let evaluator =
            create_evaluator(EvaluatorType::Rules, "Prod", 15, &ProviderConfig::default()).unwrap();
        assert_eq!(evaluator.evaluator_type(), EvaluatorType::Rules);
    }
}
