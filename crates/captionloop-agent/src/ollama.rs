use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{AgentError, ChatModel};

/// Chat model served by a local Ollama instance
pub struct OllamaChat {
    name: String,
    base_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaChat {
    pub fn new(base_url: &str, model: &str, temperature: f64) -> Self {
        Self {
            name: format!("ollama/{}", model),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            client: Client::builder()
                .timeout(Duration::from_secs(300)) // local models can be slow to load
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
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
            stream: false,
            options: Options {
                temperature: self.temperature,
            },
        };
        let url = format!("{}/api/chat", self.base_url);

        debug!(url = %url, model = %self.model, "Sending Ollama chat request");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                provider: "Ollama".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        Ok(chat.message.content)
    }
}
