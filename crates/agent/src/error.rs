use thiserror::Error;

use rfqdesk_core::errors::ApplicationError;
use rfqdesk_db::RepositoryError;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("source text is empty")]
    EmptySource,
    #[error("{0}")]
    Normalization(String),
    #[error("clarification call failed: {0}")]
    Clarification(#[source] LlmError),
    #[error("negotiation call failed: {0}")]
    Negotiation(#[source] LlmError),
    #[error("rfq store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl From<AgentError> for ApplicationError {
    fn from(error: AgentError) -> Self {
        match error {
            AgentError::EmptySource => ApplicationError::Validation(error.to_string()),
            AgentError::Normalization(detail) => ApplicationError::Normalization(detail),
            AgentError::Clarification(source) => {
                ApplicationError::Clarification(source.to_string())
            }
            AgentError::Negotiation(source) => ApplicationError::Negotiation(source.to_string()),
            AgentError::Store(source) => ApplicationError::Persistence(source.to_string()),
        }
    }
}
