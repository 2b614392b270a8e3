//! Reasoning-collaborator side of rfqdesk.
//!
//! The language model is strictly a translator: it turns source text into the
//! canonical line-item shape and drafts conversational replies. Ids, project
//! name precedence, item numbering and the number provenance check are
//! decided locally.
//!
//! - [`normalizer`] builds RFQ records from typed text or extracted files
//! - [`clarification`] drafts the next assistant turn for a refinement chat
//! - [`negotiation`] produces buyer-side guidance for one supplier quote
//! - [`runtime`] wires the three together behind one call deadline

pub mod clarification;
pub mod error;
pub mod llm;
pub mod negotiation;
pub mod normalizer;
pub mod prompts;
pub mod provenance;
pub mod providers;
pub mod runtime;

pub use clarification::ClarificationEngine;
pub use error::AgentError;
pub use llm::{CompletionRequest, LlmClient, LlmError, PromptMessage, PromptRole, ResponseFormat};
pub use negotiation::NegotiationAdvisor;
pub use normalizer::RfqNormalizer;
pub use runtime::{AgentRuntime, AgentSettings};
