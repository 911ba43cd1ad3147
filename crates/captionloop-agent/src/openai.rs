use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{AgentError, ChatModel};

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChat {
    name: String,
    base_url: String,
    model: String,
    temperature: f64,
    /// Pre-computed `"Bearer <key>"` header value
    auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(base_url: &str, model: &str, temperature: f64, api_key: Option<&str>) -> Self {
        Self {
            name: format!("openai/{}", model),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            auth_header: api_key.map(|k| format!("Bearer {k}")),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, system_prompt: &str, message: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.temperature,
        };
        let url = format!("{}/chat/completions", self.base_url);

        debug!(url = %url, model = %self.model, "Sending OpenAI chat request");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref header) = self.auth_header {
            builder = builder.header("Authorization", header);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                provider: "OpenAI".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::EmptyResponse(self.name.clone()))
    }
}
