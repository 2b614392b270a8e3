use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rfqdesk_core::config::{default_config_paths, AppConfig, LoadOptions, LogFormat};
use secrecy::ExposeSecret;
use toml::Value;

use super::{CommandResult, EXIT_CONFIG_INVALID};

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

impl Field {
    fn new(key: &'static str, env_keys: &'static [&'static str], value: impl Into<String>) -> Self {
        Self { key, env_keys, value: value.into() }
    }
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG_INVALID,
            )
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields(&config).into_iter().map(|field| {
        let source =
            field_source(&field, config_file_doc.as_ref(), config_file_path.as_deref());
        format!("- {} = {} (source: {source})", field.key, field.value)
    }));

    CommandResult::text(0, lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let llm = &config.llm;
    let server = &config.server;
    let uploads = &config.uploads;

    vec![
        Field::new("llm.provider", &["RFQDESK_LLM_PROVIDER"], llm.provider.as_str()),
        Field::new("llm.model", &["RFQDESK_LLM_MODEL"], llm.model.clone()),
        Field::new(
            "llm.base_url",
            &["RFQDESK_LLM_BASE_URL"],
            llm.base_url.as_deref().unwrap_or("<unset>"),
        ),
        Field::new(
            "llm.api_key",
            &["RFQDESK_LLM_API_KEY"],
            llm.api_key
                .as_ref()
                .map(|key| redact_secret(key.expose_secret()))
                .unwrap_or_else(|| "<unset>".to_string()),
        ),
        Field::new("llm.timeout_secs", &["RFQDESK_LLM_TIMEOUT_SECS"], llm.timeout_secs.to_string()),
        Field::new("llm.temperature", &["RFQDESK_LLM_TEMPERATURE"], llm.temperature.to_string()),
        Field::new("llm.max_tokens", &["RFQDESK_LLM_MAX_TOKENS"], llm.max_tokens.to_string()),
        Field::new("server.bind_address", &["RFQDESK_SERVER_BIND_ADDRESS"], server.bind_address.clone()),
        Field::new("server.port", &["RFQDESK_SERVER_PORT"], server.port.to_string()),
        Field::new(
            "server.static_dir",
            &["RFQDESK_SERVER_STATIC_DIR"],
            server.static_dir.display().to_string(),
        ),
        Field::new(
            "server.graceful_shutdown_secs",
            &["RFQDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            server.graceful_shutdown_secs.to_string(),
        ),
        Field::new("uploads.max_files", &["RFQDESK_UPLOADS_MAX_FILES"], uploads.max_files.to_string()),
        Field::new(
            "uploads.max_file_bytes",
            &["RFQDESK_UPLOADS_MAX_FILE_BYTES"],
            uploads.max_file_bytes.to_string(),
        ),
        Field::new(
            "uploads.temp_dir",
            &["RFQDESK_UPLOADS_TEMP_DIR"],
            uploads
                .temp_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "<system default>".to_string()),
        ),
        Field::new(
            "normalizer.max_source_chars",
            &["RFQDESK_NORMALIZER_MAX_SOURCE_CHARS"],
            config.normalizer.max_source_chars.to_string(),
        ),
        Field::new(
            "logging.level",
            &["RFQDESK_LOGGING_LEVEL", "RFQDESK_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        Field::new(
            "logging.format",
            &["RFQDESK_LOGGING_FORMAT", "RFQDESK_LOG_FORMAT"],
            log_format_name(config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &Field,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn log_format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

/// Keeps a short vendor prefix such as `sk-` and hides the rest.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.split_once('-') {
        Some((prefix, _)) if prefix.len() <= 8 => format!("{prefix}-***"),
        _ => "<redacted>".to_string(),
    }
}
