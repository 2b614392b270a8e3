use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use rfqdesk_core::config::AppConfig;
use rfqdesk_core::domain::conversation::ChatTurn;
use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::Rfq;
use rfqdesk_db::RfqRepository;
use rfqdesk_ingest::ExtractedDocument;

use crate::clarification::ClarificationEngine;
use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::negotiation::NegotiationAdvisor;
use crate::normalizer::{NormalizerOptions, RfqNormalizer};
use crate::providers::client_from_config;

#[derive(Clone, Copy, Debug)]
pub struct AgentSettings {
    pub deadline: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_source_chars: usize,
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            deadline: Duration::from_secs(config.llm.timeout_secs),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            max_source_chars: config.normalizer.max_source_chars,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Normalizer, clarification engine and advisor sharing one collaborator,
/// every call of which is bounded by `settings.deadline`.
pub struct AgentRuntime {
    normalizer: RfqNormalizer,
    clarifier: ClarificationEngine,
    advisor: NegotiationAdvisor,
}

impl AgentRuntime {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn RfqRepository>, settings: AgentSettings) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(DeadlineClient { inner: llm, deadline: settings.deadline });
        let options = NormalizerOptions {
            max_source_chars: settings.max_source_chars,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        Self {
            normalizer: RfqNormalizer::new(llm.clone(), store, options),
            clarifier: ClarificationEngine::new(llm.clone(), settings.temperature, settings.max_tokens),
            advisor: NegotiationAdvisor::new(llm, settings.temperature, settings.max_tokens),
        }
    }

    pub fn from_config(config: &AppConfig, store: Arc<dyn RfqRepository>) -> Result<Self, LlmError> {
        let llm = client_from_config(&config.llm)?;
        Ok(Self::new(llm, store, AgentSettings::from_config(config)))
    }

    pub async fn normalize_text(&self, text: &str, project_hint: Option<&str>) -> Result<Rfq, AgentError> {
        self.normalizer.normalize_text(text, project_hint).await
    }

    pub async fn normalize_documents(
        &self,
        documents: &[ExtractedDocument],
        project_hint: Option<&str>,
    ) -> Result<Rfq, AgentError> {
        self.normalizer.normalize_documents(documents, project_hint).await
    }

    pub async fn clarify(
        &self,
        rfq: &Rfq,
        history: &[ChatTurn],
        latest_message: Option<&str>,
    ) -> Result<String, AgentError> {
        self.clarifier.clarify(rfq, history, latest_message).await
    }

    pub async fn advise(
        &self,
        rfq: &Rfq,
        quote: &SupplierQuote,
        goal: Option<&str>,
    ) -> Result<String, AgentError> {
        self.advisor.advise(rfq, quote, goal).await
    }
}

struct DeadlineClient {
    inner: Arc<dyn LlmClient>,
    deadline: Duration,
}

#[async_trait]
impl LlmClient for DeadlineClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        match tokio::time::timeout(self.deadline, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    event_name = "llm.call.timeout",
                    deadline_ms = self.deadline.as_millis() as u64,
                    "collaborator call exceeded deadline"
                );
                Err(LlmError::Timeout(self.deadline))
            }
        }
    }
}
