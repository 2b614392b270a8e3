use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{check_status, endpoint, non_empty};
use crate::llm::{CompletionRequest, LlmClient, LlmError, ResponseFormat};

/// OpenAI-compatible chat completions.
pub struct OpenAiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: Client, api_key: SecretString, base_url: String, model: String) -> Self {
        Self { http, api_key, base_url, model }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage { role: "system", content: &request.system });
        messages.extend(
            request
                .messages
                .iter()
                .map(|message| ChatMessage { role: message.role.as_str(), content: &message.content }),
        );

        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages,
            response_format: (request.response_format == ResponseFormat::Json)
                .then_some(ResponseFormatSpec { kind: "json_object" }),
        };

        let response = self
            .http
            .post(endpoint(&self.base_url, "chat/completions"))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret().trim()))
            .json(&body)
            .send()
            .await?;
        let parsed: ChatResponse = check_status(response).await?.json().await?;

        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();
        non_empty(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
