use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{check_status, endpoint, non_empty};
use crate::llm::{CompletionRequest, LlmClient, LlmError, PromptMessage, PromptRole, ResponseFormat};

const API_VERSION: &str = "2023-06-01";
const JSON_ONLY: &str = "\n\nRespond with a single JSON object and no other text.";

pub struct AnthropicClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(http: Client, api_key: SecretString, base_url: String, model: String) -> Self {
        Self { http, api_key, base_url, model }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let mut system = request.system.clone();
        if request.response_format == ResponseFormat::Json {
            system.push_str(JSON_ONLY);
        }

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &system,
            messages: alternate_roles(&request.messages),
        };

        let response = self
            .http
            .post(endpoint(&self.base_url, "v1/messages"))
            .header("x-api-key", self.api_key.expose_secret().trim())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let parsed: MessagesResponse = check_status(response).await?.json().await?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        non_empty(text)
    }
}

/// The messages API wants strictly alternating turns starting with `user`;
/// consecutive same-role turns are merged.
fn alternate_roles(messages: &[PromptMessage]) -> Vec<Message> {
    let mut merged: Vec<Message> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(last) if last.role == message.role.as_str() => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => merged.push(Message {
                role: message.role.as_str(),
                content: message.content.clone(),
            }),
        }
    }
    if merged.first().is_some_and(|first| first.role == PromptRole::Assistant.as_str()) {
        merged.insert(0, Message { role: PromptRole::User.as_str(), content: "(conversation start)".to_string() });
    }
    merged
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, PartialEq, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
