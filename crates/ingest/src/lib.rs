//! Text extraction for uploaded specification files.
//!
//! Every supported format is reduced to plain UTF-8 text tagged with its
//! provenance. Extraction never fails: a file that yields nothing usable is
//! represented by a deterministic sentinel so sibling files in the same batch
//! are unaffected and downstream consumers can see what was lost.

pub mod batch;
pub mod document;
mod ooxml;
mod pdf;
mod sentinel;
mod spreadsheet;
mod word;

pub use batch::{assemble_batch, fallback_batch, FILE_MARKER_PREFIX};
pub use document::{detect_source_kind, extract_document, extract_file, ExtractedDocument};
pub use sentinel::UnreadableReason;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_CSV: &str = "text/csv";
