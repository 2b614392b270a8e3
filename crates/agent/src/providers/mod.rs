//! HTTP clients for the supported model providers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use secrecy::SecretString;

use rfqdesk_core::config::{LlmConfig, LlmProvider};

use crate::llm::{LlmClient, LlmError};

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let http = http_client(Duration::from_secs(config.timeout_secs))?;
    let base_url = config.base_url.clone();
    let model = config.model.clone();

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(
            http,
            required_key(config)?,
            base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model,
        )),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            http,
            required_key(config)?,
            base_url.unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            model,
        )),
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            http,
            base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            model,
        )),
    };
    Ok(client)
}

fn required_key(config: &LlmConfig) -> Result<SecretString, LlmError> {
    config.api_key.clone().ok_or_else(|| {
        LlmError::Transport(format!("llm.api_key is required for the {} provider", config.provider))
    })
}

fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| LlmError::Transport(format!("failed to build HTTP client: {error}")))
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Non-2xx responses become [`LlmError::Status`] with the body attached.
async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(LlmError::Status { status: status.as_u16(), body })
}

fn non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use rfqdesk_core::config::AppConfig;
    use rfqdesk_core::config::LlmProvider;

    use super::{client_from_config, endpoint};
    use crate::llm::LlmError;

    #[test]
    fn endpoints_join_without_double_slashes() {
        assert_eq!(endpoint("http://localhost:11434/", "/api/chat"), "http://localhost:11434/api/chat");
        assert_eq!(endpoint("https://api.openai.com/v1", "chat/completions"), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn hosted_providers_require_a_key() {
        let mut config = AppConfig::default().llm;
        config.provider = LlmProvider::Anthropic;
        assert!(matches!(client_from_config(&config), Err(LlmError::Transport(_))));

        config.api_key = Some(SecretString::from("sk-test".to_string()));
        assert!(client_from_config(&config).is_ok());
    }

    #[test]
    fn default_config_builds_a_local_client() {
        assert!(client_from_config(&AppConfig::default().llm).is_ok());
    }
}
