//! `POST /api/upload-specs`: multipart `files` plus an optional
//! `project_name`, extracted per file and normalized as one batch.

use std::io::Write;
use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use rfqdesk_core::domain::rfq::Rfq;
use rfqdesk_ingest::{
    detect_source_kind, extract_document, extract_file, ExtractedDocument, UnreadableReason,
};

use crate::api::AppState;
use crate::error::{correlation_id, ApiError};

const FILES_FIELD: &str = "files";
const PROJECT_NAME_FIELD: &str = "project_name";

#[derive(Debug)]
struct Upload {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

pub async fn upload_specs(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Rfq>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let limits = &state.uploads;
    let mut uploads = Vec::new();
    let mut project_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::validation(error.body_text(), &correlation_id))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILES_FIELD) => {
                if uploads.len() >= limits.max_files {
                    return Err(ApiError::validation(
                        format!("at most {} files may be uploaded at once", limits.max_files),
                        &correlation_id,
                    ));
                }
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| format!("upload-{}", uploads.len() + 1));
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| ApiError::validation(error.body_text(), &correlation_id))?;
                if bytes.len() as u64 > limits.max_file_bytes {
                    return Err(ApiError::validation(
                        format!(
                            "`{filename}` is {} bytes; the limit is {} bytes per file",
                            bytes.len(),
                            limits.max_file_bytes
                        ),
                        &correlation_id,
                    ));
                }
                uploads.push(Upload { filename, content_type, bytes: bytes.to_vec() });
            }
            Some(PROJECT_NAME_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|error| ApiError::validation(error.body_text(), &correlation_id))?;
                project_name = Some(value).filter(|name| !name.trim().is_empty());
            }
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::validation(
            "at least one file is required in the `files` field",
            &correlation_id,
        ));
    }

    let mut documents = Vec::with_capacity(uploads.len());
    for upload in uploads {
        documents.push(extract_upload(upload, limits.temp_dir.clone()).await);
    }

    let unreadable = documents.iter().filter(|document| !document.usable).count();
    info!(
        event_name = "api.upload.extracted",
        correlation_id = %correlation_id,
        files = documents.len(),
        unreadable,
        "uploaded files extracted"
    );

    let rfq = state
        .runtime
        .normalize_documents(&documents, project_name.as_deref())
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.upload.completed",
        correlation_id = %correlation_id,
        rfq_id = %rfq.id,
        line_items = rfq.line_items.len(),
        "rfq created from uploaded files"
    );
    Ok(Json(rfq))
}

async fn extract_upload(upload: Upload, temp_dir: Option<PathBuf>) -> ExtractedDocument {
    let filename = upload.filename.clone();
    let origin = detect_source_kind(&upload.filename, upload.content_type.as_deref());

    match tokio::task::spawn_blocking(move || extract_via_temp_file(upload, temp_dir)).await {
        Ok(document) => document,
        Err(error) => {
            warn!(
                event_name = "ingest.extract.task_failed",
                filename = %filename,
                error = %error,
                "extraction task did not complete"
            );
            ExtractedDocument::unreadable(&filename, origin, UnreadableReason::ReadFailed)
        }
    }
}

/// The temporary file is removed when `temp` drops; removal errors are ignored.
fn extract_via_temp_file(upload: Upload, temp_dir: Option<PathBuf>) -> ExtractedDocument {
    let content_type = upload.content_type.as_deref();
    let temp = match temp_dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    };

    let mut temp = match temp {
        Ok(temp) => temp,
        Err(error) => {
            warn!(
                event_name = "ingest.temp_file.unavailable",
                filename = %upload.filename,
                error = %error,
                "extracting from memory"
            );
            return extract_document(&upload.bytes, &upload.filename, content_type);
        }
    };

    if let Err(error) = temp.write_all(&upload.bytes).and_then(|()| temp.flush()) {
        warn!(
            event_name = "ingest.temp_file.write_failed",
            filename = %upload.filename,
            error = %error,
            "extracting from memory"
        );
        return extract_document(&upload.bytes, &upload.filename, content_type);
    }

    let document = extract_file(temp.path(), &upload.filename, content_type);
    let _ = temp.close();
    document
}
