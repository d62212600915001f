use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const INGEST_HELP_COMMAND: &str = "invoicedash ingest --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `invoicedash {cmd} --help` for usage."),
            None => "Run `invoicedash --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_ingest_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a JSON array of extraction records.".to_string(),
                format!("Run `{INGEST_HELP_COMMAND}` to review the record shape."),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array"],
            "help_command": INGEST_HELP_COMMAND,
        }))
    }

    /// Dashboard-facing failure: `message` is the fixed per-endpoint text, the
    /// underlying cause is logged by the caller and never exposed here.
    pub fn aggregation_failed(endpoint: &str, message: &str) -> Self {
        Self::new(
            "aggregation_failed",
            message,
            vec!["Retry the request. If it keeps failing, check the server logs.".to_string()],
        )
        .with_data(json!({
            "endpoint": endpoint,
        }))
    }

    pub fn chat_upstream_failed(status: u16, details: &str) -> Self {
        Self::new(
            "chat_upstream_failed",
            "Failed to process query with the text-to-SQL service.",
            vec![
                "Rephrase the question and retry.".to_string(),
                "Check that the text-to-SQL service is healthy.".to_string(),
            ],
        )
        .with_data(json!({
            "status": status,
            "details": details,
        }))
    }

    pub fn chat_transport_failed(details: &str) -> Self {
        Self::new(
            "chat_transport_failed",
            "Failed to process chat query.",
            vec!["Verify `VANNA_API_BASE_URL` points at a running text-to-SQL service.".to_string()],
        )
        .with_data(json!({
            "status": 500,
            "details": details,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn export_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "export_failed",
            &format!("Could not write export to `{location}`: {detail}"),
            vec![format!("Verify `{location}` is a writable directory.")],
        )
    }

    pub fn store_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_init_permission_denied",
            &format!("Cannot initialize store at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `INVOICEDASH_HOME` to a writable directory."
            )],
        )
    }

    pub fn store_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_locked",
            &format!("Analytics database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn store_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_corrupt",
            &format!("Analytics database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid SQLite file or re-run ingestion into a fresh home."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Schema migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn store_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_init_failed",
            &format!("Store operation failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    pub fn store_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_write_failed",
            &format!("Write to analytics database failed at `{location}`: {detail}"),
            vec!["Check the record named in the ingestion log and re-run ingestion.".to_string()],
        )
    }

    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_")
            || matches!(
                self.code.as_str(),
                "store_init_permission_denied"
                    | "store_locked"
                    | "store_corrupt"
                    | "migration_failed"
                    | "store_init_failed"
                    | "store_write_failed"
                    | "export_failed"
                    | "aggregation_failed"
                    | "chat_transport_failed"
            )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
