use std::fmt;

use serde::Serialize;

/// Why a file produced no usable text. The rendered message is fixed per
/// variant so the same file always yields the same sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadableReason {
    EmptyFile,
    InvalidUtf8,
    ReadFailed,
    ScannedPdf,
    LegacySpreadsheet,
    EmptyWorkbook,
    EmptyDocument,
    CorruptArchive,
    EntryTooLarge,
}

impl UnreadableReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyFile => "the file is empty",
            Self::InvalidUtf8 => "the file is not valid UTF-8 text",
            Self::ReadFailed => "the file could not be read",
            Self::ScannedPdf => {
                "the PDF contains no extractable text; it may be scanned or image-based"
            }
            Self::LegacySpreadsheet => {
                "legacy .xls spreadsheets are not supported; re-save the file as .xlsx or .csv"
            }
            Self::EmptyWorkbook => "the spreadsheet has no readable cells",
            Self::EmptyDocument => "the document contains no text",
            Self::CorruptArchive => "the file is not a readable office document",
            Self::EntryTooLarge => "a document part exceeds the decompressed size limit",
        }
    }

    pub(crate) fn sentinel(&self, filename: &str) -> String {
        format!("[no content extracted from {filename}: {}]", self.message())
    }
}

impl fmt::Display for UnreadableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
