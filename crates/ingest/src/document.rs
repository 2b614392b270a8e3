use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use rfqdesk_core::domain::rfq::{SourceKind, SourceRef};

use crate::sentinel::UnreadableReason;
use crate::{pdf, spreadsheet, word, MIME_CSV, MIME_DOCX, MIME_PDF, MIME_XLS, MIME_XLSX};

/// Text extracted from one file, or a sentinel when nothing usable was found.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub origin: SourceKind,
    pub text: String,
    pub usable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<UnreadableReason>,
}

impl ExtractedDocument {
    fn readable(filename: &str, origin: SourceKind, text: String) -> Self {
        Self { filename: filename.to_string(), origin, text, usable: true, unreadable: None }
    }

    pub fn unreadable(filename: &str, origin: SourceKind, reason: UnreadableReason) -> Self {
        Self {
            filename: filename.to_string(),
            origin,
            text: reason.sentinel(filename),
            usable: false,
            unreadable: Some(reason),
        }
    }

    pub fn source_ref(&self) -> SourceRef {
        SourceRef { filename: self.filename.clone(), origin: self.origin }
    }
}

/// Extension wins over the declared content type; the declared type only
/// decides files whose extension is missing or unfamiliar.
pub fn detect_source_kind(filename: &str, content_type: Option<&str>) -> SourceKind {
    let extension = Path::new(filename)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("xlsx" | "xlsm") => return SourceKind::Spreadsheet,
        Some("xls") => return SourceKind::LegacySpreadsheet,
        Some("csv" | "tsv") => return SourceKind::Csv,
        Some("pdf") => return SourceKind::Pdf,
        Some("docx") => return SourceKind::WordDocument,
        _ => {}
    }

    let mime = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some(MIME_XLSX) => SourceKind::Spreadsheet,
        Some(MIME_XLS) => SourceKind::LegacySpreadsheet,
        Some(MIME_CSV) => SourceKind::Csv,
        Some(MIME_PDF) => SourceKind::Pdf,
        Some(MIME_DOCX) => SourceKind::WordDocument,
        _ => SourceKind::PlainText,
    }
}

pub fn extract_document(
    bytes: &[u8],
    filename: &str,
    content_type: Option<&str>,
) -> ExtractedDocument {
    let origin = detect_source_kind(filename, content_type);
    let document = if bytes.is_empty() {
        ExtractedDocument::unreadable(filename, origin, UnreadableReason::EmptyFile)
    } else {
        match extract_by_kind(bytes, filename, origin) {
            Ok(text) => ExtractedDocument::readable(filename, origin, text),
            Err(reason) => ExtractedDocument::unreadable(filename, origin, reason),
        }
    };

    match document.unreadable {
        Some(reason) => warn!(
            event_name = "ingest.extract.unreadable",
            filename,
            origin = %origin,
            reason = ?reason,
            "no usable text extracted"
        ),
        None => debug!(
            event_name = "ingest.extract.completed",
            filename,
            origin = %origin,
            chars = document.text.chars().count(),
            "text extracted"
        ),
    }
    document
}

/// Reads `path` and extracts it under the caller-supplied `filename`.
pub fn extract_file(path: &Path, filename: &str, content_type: Option<&str>) -> ExtractedDocument {
    match std::fs::read(path) {
        Ok(bytes) => extract_document(&bytes, filename, content_type),
        Err(error) => {
            warn!(
                event_name = "ingest.extract.read_failed",
                filename,
                path = %path.display(),
                error = %error,
                "could not read upload from disk"
            );
            let origin = detect_source_kind(filename, content_type);
            ExtractedDocument::unreadable(filename, origin, UnreadableReason::ReadFailed)
        }
    }
}

fn extract_by_kind(
    bytes: &[u8],
    filename: &str,
    origin: SourceKind,
) -> Result<String, UnreadableReason> {
    match origin {
        SourceKind::LegacySpreadsheet => Err(UnreadableReason::LegacySpreadsheet),
        SourceKind::Pdf => pdf::extract_pdf(bytes, filename),
        SourceKind::Spreadsheet => spreadsheet::extract_xlsx(bytes)
            .map_err(|error| log_ooxml(filename, &error))
            .and_then(|text| non_empty(text, UnreadableReason::EmptyWorkbook)),
        SourceKind::WordDocument => word::extract_docx(bytes)
            .map_err(|error| log_ooxml(filename, &error))
            .and_then(|text| non_empty(text, UnreadableReason::EmptyDocument)),
        SourceKind::Csv | SourceKind::PlainText => plain_text(bytes),
    }
}

fn log_ooxml(filename: &str, error: &crate::ooxml::OoxmlError) -> UnreadableReason {
    warn!(
        event_name = "ingest.ooxml.failed",
        filename,
        error = %error,
        "office document could not be parsed"
    );
    error.reason()
}

fn plain_text(bytes: &[u8]) -> Result<String, UnreadableReason> {
    let text = std::str::from_utf8(bytes).map_err(|_| UnreadableReason::InvalidUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    non_empty(text.to_string(), UnreadableReason::EmptyFile)
}

fn non_empty(text: String, reason: UnreadableReason) -> Result<String, UnreadableReason> {
    if text.trim().is_empty() {
        Err(reason)
    } else {
        Ok(text)
    }
}
