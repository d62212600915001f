mod chat_text;
mod dashboard_text;
mod error_text;
mod format;
mod ingest_text;
mod json;
mod mode;
mod store_text;

use std::io;

use invoicedash_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::{write_stdout_line, write_stdout_text};

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => write_stdout_line(&render_text_success(success)?),
        OutputMode::Json => write_stdout_line(&json::render_success_json(success)?),
        OutputMode::EventStream => write_stdout_text(&json::render_event_stream(success)?),
    }
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json | OutputMode::EventStream => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    let data = &success.data;
    match success.command.as_str() {
        "ingest" => ingest_text::render_ingest_run(data),
        "ingest list" => ingest_text::render_ingest_list(data),
        "stats" => dashboard_text::render_stats(data),
        "trends" => dashboard_text::render_trends(data),
        "vendors top" => dashboard_text::render_top_vendors(data),
        "categories" => dashboard_text::render_categories(data),
        "cash-outflow" => dashboard_text::render_cash_outflow(data),
        "invoices" => dashboard_text::render_invoices(data),
        "chat" => chat_text::render_chat(data),
        "db status" => store_text::render_db_status(data),
        "export csv" => store_text::render_export(data),
        "health" => store_text::render_health(data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
