use std::sync::Arc;

use tracing::info;

use rfqdesk_core::domain::conversation::ChatTurn;
use rfqdesk_core::domain::rfq::Rfq;

use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient, LlmError, PromptMessage, ResponseFormat};
use crate::prompts;

/// Drafts the next assistant turn of a refinement chat. Never writes to the
/// RFQ store; the snapshot it sends is the only ground truth the model gets.
pub struct ClarificationEngine {
    llm: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
}

impl ClarificationEngine {
    pub fn new(llm: Arc<dyn LlmClient>, temperature: f32, max_tokens: u32) -> Self {
        Self { llm, temperature, max_tokens }
    }

    pub async fn clarify(
        &self,
        rfq: &Rfq,
        history: &[ChatTurn],
        latest_message: Option<&str>,
    ) -> Result<String, AgentError> {
        let request = self.request(rfq, history, latest_message);
        let reply = match self.llm.complete(request).await {
            Ok(reply) => reply,
            Err(LlmError::EmptyResponse) => String::new(),
            Err(error) => return Err(AgentError::Clarification(error)),
        };

        let reply = reply.trim();
        info!(
            event_name = "rfq.clarify.completed",
            rfq_id = %rfq.id,
            history_turns = history.len(),
            empty_reply = reply.is_empty(),
            "clarification turn drafted"
        );
        if reply.is_empty() {
            Ok(prompts::DEFAULT_CLARIFICATION.to_string())
        } else {
            Ok(reply.to_string())
        }
    }

    fn request(
        &self,
        rfq: &Rfq,
        history: &[ChatTurn],
        latest_message: Option<&str>,
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::user(prompts::clarification_context(rfq)));
        messages.extend(history.iter().map(PromptMessage::from));

        let latest = latest_message.map(str::trim).filter(|message| !message.is_empty());
        messages.push(PromptMessage::user(match latest {
            Some(message) => prompts::clarification_latest(message),
            None => prompts::PROPOSE_REFINEMENTS.to_string(),
        }));

        CompletionRequest {
            system: prompts::CLARIFICATION_SYSTEM.to_string(),
            messages,
            response_format: ResponseFormat::Text,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
