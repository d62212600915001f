use std::io;

use invoicedash_client::chat::{ChatEvent, render_sse};
use invoicedash_client::{ClientError, ContractKind, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

/// Endpoint payloads print as-is; reports keep the versioned wrapper, except
/// the run list, which prints its rows.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match (success.kind, success.command.as_str()) {
        (ContractKind::Endpoint, _) => success.data.clone(),
        (ContractKind::Report, "ingest list") => success
            .data
            .get("rows")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        (ContractKind::Report, _) => json!({
            "ok": true,
            "version": JSON_VERSION,
            "data": success.data.clone()
        }),
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data {
        payload["error"]["data"] = data.clone();
    }
    serialize_json_pretty(&payload)
}

pub fn render_event_stream(success: &SuccessEnvelope) -> io::Result<String> {
    let events = serde_json::from_value::<Vec<ChatEvent>>(success.data.clone())
        .map_err(io::Error::other)?;
    render_sse(&events).map_err(io::Error::other)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
