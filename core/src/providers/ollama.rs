use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
}

pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(300))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30).min(timeout))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3:12b".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn convert_messages(messages: &[ChatMessage]) -> Vec<OllamaMessage<'_>> {
        messages
            .iter()
            .map(|m| OllamaMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect()
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let ollama_request = OllamaRequest {
            model: &self.model,
            messages: Self::convert_messages(request.messages),
            options: request
                .temperature
                .map(|temperature| OllamaOptions { temperature }),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ollama_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Ollama API error ({}): {}",
                status,
                error_text
            ));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        let message = ollama_response.message;

        // Reasoning models sometimes stop after the thinking phase.
        let text = match message.content {
            Some(content) if !content.is_empty() => Some(content),
            content => match message.thinking {
                Some(thinking) if !thinking.is_empty() => {
                    let preview: String = thinking.chars().take(200).collect();
                    Some(format!(
                        "I was thinking about this: {}... but I didn't complete my response. Could you try asking again?",
                        preview
                    ))
                }
                _ => content,
            },
        };

        Ok(ChatResponse { text })
    }
}
