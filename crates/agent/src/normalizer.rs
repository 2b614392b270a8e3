use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use rfqdesk_core::compat::LineItemDraft;
use rfqdesk_core::config::DEFAULT_MAX_SOURCE_CHARS;
use rfqdesk_core::domain::rfq::{resolve_project_name, LineItem, Rfq, SourceRef};
use rfqdesk_core::lenient;
use rfqdesk_db::RfqRepository;
use rfqdesk_ingest::{assemble_batch, ExtractedDocument};

use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient, PromptMessage, ResponseFormat};
use crate::prompts;
use crate::provenance::{verify_line_item, SourceNumbers};

pub const TRUNCATION_MARKER: &str = "\n\n[... source truncated ...]";

#[derive(Clone, Copy, Debug)]
pub struct NormalizerOptions {
    pub max_source_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self { max_source_chars: DEFAULT_MAX_SOURCE_CHARS, temperature: 0.0, max_tokens: 2048 }
    }
}

/// Turns source text into a stored [`Rfq`].
pub struct RfqNormalizer {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn RfqRepository>,
    options: NormalizerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractionPayload {
    #[serde(alias = "project", deserialize_with = "lenient::option_string")]
    project_name: Option<String>,
    #[serde(alias = "items")]
    line_items: Option<Vec<LineItemDraft>>,
}

impl RfqNormalizer {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn RfqRepository>,
        options: NormalizerOptions,
    ) -> Self {
        Self { llm, store, options }
    }

    /// Buyer-typed free text.
    pub async fn normalize_text(
        &self,
        text: &str,
        project_hint: Option<&str>,
    ) -> Result<Rfq, AgentError> {
        self.normalize(text, project_hint, Vec::new()).await
    }

    /// An upload batch, joined with per-file markers.
    pub async fn normalize_documents(
        &self,
        documents: &[ExtractedDocument],
        project_hint: Option<&str>,
    ) -> Result<Rfq, AgentError> {
        let text = assemble_batch(documents);
        let sources = documents.iter().map(ExtractedDocument::source_ref).collect();
        self.normalize(&text, project_hint, sources).await
    }

    pub async fn normalize(
        &self,
        source_text: &str,
        project_hint: Option<&str>,
        sources: Vec<SourceRef>,
    ) -> Result<Rfq, AgentError> {
        if source_text.trim().is_empty() {
            return Err(AgentError::EmptySource);
        }

        let prepared = truncate_source(source_text, self.options.max_source_chars);
        let request = CompletionRequest {
            system: prompts::NORMALIZER_SYSTEM.to_string(),
            messages: vec![PromptMessage::user(prompts::normalizer_user_message(
                &prepared,
                project_hint,
            ))],
            response_format: ResponseFormat::Json,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };

        let raw = self
            .llm
            .complete(request)
            .await
            .map_err(|error| AgentError::Normalization(format!("extraction call failed: {error}")))?;
        let payload = decode_extraction(&raw).map_err(|error| {
            AgentError::Normalization(format!("could not decode extraction output: {error}"))
        })?;

        let mut line_items = assign_item_ids(
            payload
                .line_items
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(index, draft)| draft.into_line_item(index))
                .collect(),
        );

        let numbers = SourceNumbers::scan(source_text);
        let cleared = line_items.iter_mut().map(|item| verify_line_item(item, &numbers)).sum::<usize>();
        if cleared > 0 {
            warn!(
                event_name = "rfq.normalize.unverified_numbers",
                cleared,
                "extracted numbers not present in source were cleared"
            );
        }

        let project_name = resolve_project_name(payload.project_name.as_deref(), project_hint);
        let rfq = Rfq::new(project_name, line_items, source_text, sources);
        self.store.save(rfq.clone()).await?;

        info!(
            event_name = "rfq.normalize.completed",
            rfq_id = %rfq.id,
            line_items = rfq.line_items.len(),
            sources = rfq.sources.len(),
            truncated = matches!(prepared, Cow::Owned(_)),
            "rfq normalized and stored"
        );
        Ok(rfq)
    }
}

/// Deterministic prefix of at most `max_chars` characters plus a marker.
pub fn truncate_source(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Tolerates markdown fences and prose around the JSON object.
fn decode_extraction(raw: &str) -> Result<ExtractionPayload, String> {
    let trimmed = strip_code_fence(raw.trim());
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => return Err(format!("no JSON object in output: {}", preview(raw))),
    };
    serde_json::from_str::<ExtractionPayload>(candidate).map_err(|error| error.to_string())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn preview(raw: &str) -> String {
    let cut = raw.char_indices().nth(120).map(|(index, _)| index).unwrap_or(raw.len());
    raw[..cut].to_string()
}

/// Blank or repeated ids become `item-<n>` (1-based position, bumped past
/// ids already taken).
fn assign_item_ids(mut items: Vec<LineItem>) -> Vec<LineItem> {
    let mut taken = HashSet::new();
    let mut needs_id = Vec::new();

    for (index, item) in items.iter_mut().enumerate() {
        item.item_id = item.item_id.trim().to_string();
        if item.item_id.is_empty() || !taken.insert(item.item_id.clone()) {
            needs_id.push(index);
        }
    }

    for index in needs_id {
        let mut n = index + 1;
        while taken.contains(&format!("item-{n}")) {
            n += 1;
        }
        let id = format!("item-{n}");
        taken.insert(id.clone());
        items[index].item_id = id;
    }
    items
}
