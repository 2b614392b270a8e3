use std::sync::Arc;

use tracing::info;

use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::Rfq;

use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient, LlmError, PromptMessage, ResponseFormat};
use crate::prompts;

pub struct NegotiationAdvisor {
    llm: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
}

impl NegotiationAdvisor {
    pub fn new(llm: Arc<dyn LlmClient>, temperature: f32, max_tokens: u32) -> Self {
        Self { llm, temperature, max_tokens }
    }

    /// Free-text guidance; a blank `goal` falls back to the default goal.
    pub async fn advise(
        &self,
        rfq: &Rfq,
        quote: &SupplierQuote,
        goal: Option<&str>,
    ) -> Result<String, AgentError> {
        let goal = goal
            .map(str::trim)
            .filter(|goal| !goal.is_empty())
            .unwrap_or(prompts::DEFAULT_NEGOTIATION_GOAL);

        let request = CompletionRequest {
            system: prompts::NEGOTIATION_SYSTEM.to_string(),
            messages: vec![PromptMessage::user(prompts::negotiation_context(rfq, quote, goal))],
            response_format: ResponseFormat::Text,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let advice = match self.llm.complete(request).await {
            Ok(advice) => advice,
            Err(LlmError::EmptyResponse) => String::new(),
            Err(error) => return Err(AgentError::Negotiation(error)),
        };

        info!(event_name = "rfq.negotiate.completed", rfq_id = %rfq.id, "negotiation advice drafted");
        let advice = advice.trim();
        if advice.is_empty() {
            Ok(prompts::DEFAULT_ADVICE.to_string())
        } else {
            Ok(advice.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use rfqdesk_core::domain::quote::SupplierQuote;
    use rfqdesk_core::domain::rfq::Rfq;

    use super::NegotiationAdvisor;
    use crate::error::AgentError;
    use crate::llm::testing::ScriptedLlm;
    use crate::llm::LlmError;
    use crate::prompts::{DEFAULT_ADVICE, DEFAULT_NEGOTIATION_GOAL};

    fn quote() -> SupplierQuote {
        SupplierQuote::from_value(json!({"unit_price": 41.5, "payment_terms": "prepaid"}))
            .expect("object quote")
    }

    #[tokio::test]
    async fn default_goal_is_used_when_none_given() {
        let llm = Arc::new(ScriptedLlm::replying(["Ask for NET30 instead of prepayment."]));
        let advisor = NegotiationAdvisor::new(llm.clone(), 0.2, 512);
        let rfq = Rfq::new("Pipe", Vec::new(), "pipe", Vec::new());

        let advice = advisor.advise(&rfq, &quote(), None).await.expect("advice");
        assert_eq!(advice, "Ask for NET30 instead of prepayment.");
        assert!(llm.requests()[0].messages[0].content.contains(DEFAULT_NEGOTIATION_GOAL));
    }

    #[tokio::test]
    async fn empty_output_gets_default_advice() {
        let llm = Arc::new(ScriptedLlm::replying([""]));
        let advisor = NegotiationAdvisor::new(llm, 0.2, 512);
        let rfq = Rfq::new("Pipe", Vec::new(), "pipe", Vec::new());

        let advice = advisor.advise(&rfq, &quote(), Some("Lower price")).await.expect("advice");
        assert_eq!(advice, DEFAULT_ADVICE);
    }

    #[tokio::test]
    async fn missing_provider_content_gets_default_advice() {
        let llm = Arc::new(ScriptedLlm::failing(LlmError::EmptyResponse));
        let advisor = NegotiationAdvisor::new(llm, 0.2, 512);
        let rfq = Rfq::new("Pipe", Vec::new(), "pipe", Vec::new());

        let advice = advisor.advise(&rfq, &quote(), None).await.expect("default advice");
        assert_eq!(advice, DEFAULT_ADVICE);
    }

    #[tokio::test]
    async fn failure_is_a_negotiation_error() {
        let llm = Arc::new(ScriptedLlm::failing(LlmError::Status { status: 502, body: "bad gateway".into() }));
        let advisor = NegotiationAdvisor::new(llm, 0.2, 512);
        let rfq = Rfq::new("Pipe", Vec::new(), "pipe", Vec::new());

        let error = advisor.advise(&rfq, &quote(), None).await.expect_err("should fail");
        assert!(matches!(error, AgentError::Negotiation(LlmError::Status { status: 502, .. })));
    }
}
