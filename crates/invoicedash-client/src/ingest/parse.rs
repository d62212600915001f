use serde_json::Value;

use crate::{ClientError, ClientResult};

/// Splits the source into per-record values. Only the outer shape is checked
/// here; each record is deserialized on its own so one malformed record cannot
/// reject the batch.
pub(crate) fn parse_source(content: &str) -> ClientResult<Vec<Value>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_ingest_format(
            "Ingestion source is empty.",
            "empty",
        ));
    }

    if looks_like_ndjson(trimmed) {
        return Err(ClientError::invalid_ingest_format(
            "NDJSON is not supported. Provide a JSON array of extraction records.",
            "ndjson",
        ));
    }

    let parsed = serde_json::from_str::<Value>(trimmed).map_err(|error| {
        ClientError::invalid_ingest_format(&format!("Invalid JSON input: {error}"), "invalid_json")
    })?;

    match parsed {
        Value::Array(records) => Ok(records),
        _ => Err(ClientError::invalid_ingest_format(
            "JSON input must be a top-level array of extraction records.",
            "json_non_array",
        )),
    }
}

fn looks_like_ndjson(content: &str) -> bool {
    let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
    let first = lines.next();
    let second = lines.next();
    matches!((first, second), (Some(a), Some(b)) if a.starts_with('{') && a.ends_with('}') && b.starts_with('{'))
}
