use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use rfqdesk_agent::{AgentRuntime, AgentSettings, CompletionRequest, LlmClient, LlmError};
use rfqdesk_core::config::{AppConfig, LlmProvider};
use rfqdesk_db::{InMemoryQuoteLedgerRepository, InMemoryRfqRepository, RfqRepository};

use crate::api::{self, AppState, LlmSummary};

#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().expect("requests lock").push(request);
        self.replies.lock().expect("replies lock").pop_front().ok_or(LlmError::EmptyResponse)
    }
}

pub fn test_state(llm: ScriptedLlm) -> (AppState, Arc<ScriptedLlm>) {
    let llm = Arc::new(llm);
    let state = build_state(llm.clone(), Arc::new(InMemoryRfqRepository::default()));
    (state, llm)
}

pub fn state_with(llm: ScriptedLlm, rfqs: Arc<dyn RfqRepository>) -> AppState {
    build_state(Arc::new(llm), rfqs)
}

pub fn test_router(llm: ScriptedLlm, static_dir: &Path) -> (Router, AppState, Arc<ScriptedLlm>) {
    let (state, llm) = test_state(llm);
    (api::router(state.clone(), static_dir), state, llm)
}

fn build_state(llm: Arc<ScriptedLlm>, rfqs: Arc<dyn RfqRepository>) -> AppState {
    let runtime = AgentRuntime::new(llm, rfqs.clone(), AgentSettings::default());
    AppState::new(
        Arc::new(runtime),
        rfqs,
        Arc::new(InMemoryQuoteLedgerRepository::default()),
        AppConfig::default().uploads,
        LlmSummary { provider: LlmProvider::Ollama, model: "llama3.1".to_string() },
    )
}
