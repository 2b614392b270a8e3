use std::sync::Arc;

use axum::Router;
use rfqdesk_agent::{AgentRuntime, LlmError};
use rfqdesk_core::config::{AppConfig, ConfigError};
use rfqdesk_db::{InMemoryQuoteLedgerRepository, InMemoryRfqRepository, RfqRepository};
use thiserror::Error;
use tracing::info;

use crate::api::{self, AppState, LlmSummary};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

impl Application {
    pub fn router(&self) -> Router {
        api::router(self.state.clone(), &self.config.server.static_dir)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("language model client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        llm_provider = %config.llm.provider,
        llm_model = %config.llm.model,
        "starting application bootstrap"
    );

    let rfqs: Arc<dyn RfqRepository> = Arc::new(InMemoryRfqRepository::default());
    let quotes = Arc::new(InMemoryQuoteLedgerRepository::default());
    let runtime = AgentRuntime::from_config(&config, rfqs.clone()).map_err(BootstrapError::Llm)?;

    let state = AppState::new(
        Arc::new(runtime),
        rfqs,
        quotes,
        config.uploads.clone(),
        LlmSummary { provider: config.llm.provider, model: config.llm.model.clone() },
    );

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "in-memory stores and agent runtime initialized"
    );
    Ok(Application { config, state })
}
