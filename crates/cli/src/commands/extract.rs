use std::path::Path;

use anyhow::{bail, Context, Result};
use rfqdesk_ingest::{extract_file, ExtractedDocument};

use super::{CommandResult, EXIT_INPUT_MISSING, EXIT_NOTHING_EXTRACTED};

pub fn run(path: &Path, json_output: bool) -> CommandResult {
    let document = match extract(path) {
        Ok(document) => document,
        Err(error) => {
            return CommandResult::failure(
                "extract",
                "input_unavailable",
                format!("{error:#}"),
                EXIT_INPUT_MISSING,
            )
        }
    };

    let exit_code = if document.usable { 0 } else { EXIT_NOTHING_EXTRACTED };
    if !json_output {
        return CommandResult::text(exit_code, document.text);
    }

    match serde_json::to_string_pretty(&document) {
        Ok(output) => CommandResult::text(exit_code, output),
        Err(error) => CommandResult::failure(
            "extract",
            "serialization",
            error.to_string(),
            EXIT_NOTHING_EXTRACTED,
        ),
    }
}

fn extract(path: &Path) -> Result<ExtractedDocument> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("cannot read `{}`", path.display()))?;
    if !metadata.is_file() {
        bail!("`{}` is not a regular file", path.display());
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(extract_file(path, &filename, None))
}
