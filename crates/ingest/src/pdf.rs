use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::sentinel::UnreadableReason;

pub(crate) fn extract_pdf(bytes: &[u8], filename: &str) -> Result<String, UnreadableReason> {
    // pdf-extract panics on some malformed inputs.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(error)) => {
            warn!(
                event_name = "ingest.pdf.decode_failed",
                filename,
                error = %error,
                "pdf text decoding failed"
            );
            return Err(UnreadableReason::ScannedPdf);
        }
        Err(_) => {
            warn!(event_name = "ingest.pdf.decode_panicked", filename, "pdf decoder aborted");
            return Err(UnreadableReason::ScannedPdf);
        }
    };

    if text.chars().any(char::is_alphanumeric) {
        Ok(text.trim().to_string())
    } else {
        Err(UnreadableReason::ScannedPdf)
    }
}
