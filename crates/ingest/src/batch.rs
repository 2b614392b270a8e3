use crate::document::ExtractedDocument;

pub const FILE_MARKER_PREFIX: &str = "===== FILE:";

fn marker(document: &ExtractedDocument) -> String {
    format!("{FILE_MARKER_PREFIX} {} ({}) =====", document.filename, document.origin)
}

/// Joins every document (sentinels included) behind a per-file marker. When
/// no document is usable the synthesized [`fallback_batch`] is returned.
pub fn assemble_batch(documents: &[ExtractedDocument]) -> String {
    if !documents.iter().any(|document| document.usable) {
        return fallback_batch(documents);
    }

    documents
        .iter()
        .map(|document| format!("{}\n{}", marker(document), document.text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn fallback_batch(documents: &[ExtractedDocument]) -> String {
    let mut out = String::from(
        "No readable text could be extracted from the uploaded files. \
         Record each file below as an open requirement so the buyer can supply the details.\n",
    );
    for document in documents {
        out.push_str(&format!("\n{}\n{}\n", marker(document), document.text.trim_end()));
    }
    if documents.is_empty() {
        out.push_str("\n(no files were received)\n");
    }
    out
}
