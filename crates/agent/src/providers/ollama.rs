use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, endpoint, non_empty};
use crate::llm::{CompletionRequest, LlmClient, LlmError, ResponseFormat};

/// Local models served by Ollama's `/api/chat`.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(http: Client, base_url: String, model: String) -> Self {
        Self { http, base_url, model }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
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
            messages,
            stream: false,
            format: (request.response_format == ResponseFormat::Json).then_some("json"),
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response =
            self.http.post(endpoint(&self.base_url, "api/chat")).json(&body).send().await?;
        let parsed: ChatResponse = check_status(response).await?.json().await?;
        non_empty(parsed.message.map(|message| message.content).unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}
