//! Batch ingestion of extraction records.
//!
//! Records are processed one at a time, each inside its own `IMMEDIATE`
//! transaction. A failing record rolls back alone and is counted; the batch
//! stops once the error count exceeds the configured threshold.

pub mod input;
pub(crate) mod ledger;
pub(crate) mod normalize;
pub(crate) mod parse;
pub(crate) mod persist;

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, DEFAULT_ERROR_THRESHOLD, DEFAULT_PROGRESS_EVERY};
use crate::contracts::types::IngestSummary;
use crate::extract::envelope::SourceRecord;
use crate::extract::fields::format_timestamp;
use crate::ingest::input::ResolvedSource;
use crate::ingest::normalize::normalize_record;
use crate::ingest::persist::{PersistOutcome, persist_record};
use crate::state::map_sqlite_write_error;
use crate::{ClientError, ClientResult};

/// What happens to line items when a record's invoice already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineItemPolicy {
    /// Every ingestion appends the record's line items.
    #[default]
    Append,
    /// Line items are written only by the ingestion that created the invoice.
    SkipExisting,
}

impl LineItemPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::SkipExisting => "skip-existing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "append" => Some(Self::Append),
            "skip-existing" => Some(Self::SkipExisting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub error_threshold: usize,
    pub progress_every: usize,
    pub line_item_policy: LineItemPolicy,
}

impl IngestOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            error_threshold: config.ingest_error_threshold,
            progress_every: config.progress_every,
            line_item_policy: LineItemPolicy::default(),
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            progress_every: DEFAULT_PROGRESS_EVERY,
            line_item_policy: LineItemPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct IngestOutcome {
    pub(crate) run_id: String,
    pub(crate) summary: IngestSummary,
}

#[derive(Debug, Error)]
enum RecordError {
    #[error("malformed record: {0}")]
    Shape(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] ClientError),
}

impl RecordError {
    fn code(&self) -> &str {
        match self {
            Self::Shape(_) => "invalid_record",
            Self::Store(error) => error.code.as_str(),
        }
    }
}

enum RecordOutcome {
    Persisted(PersistOutcome),
    Skipped,
}

pub(crate) fn execute(
    connection: &mut Connection,
    db_path: &Path,
    source: &ResolvedSource,
    options: &IngestOptions,
) -> ClientResult<IngestOutcome> {
    let records = parse::parse_source(&source.content)?;

    let run_id = ledger::start_run(
        connection,
        db_path,
        source.source_kind.as_str(),
        source.source_ref.as_deref(),
        &now_timestamp(),
    )?;
    info!(
        run_id = %run_id,
        records = records.len(),
        line_item_policy = options.line_item_policy.as_str(),
        "starting ingestion"
    );

    let summary = ingest_records(connection, db_path, &records, options);

    ledger::finish_run(connection, db_path, &run_id, &summary, &now_timestamp())?;
    info!(
        run_id = %run_id,
        processed = summary.processed,
        skipped = summary.skipped,
        errors = summary.errors,
        aborted = summary.aborted,
        "ingestion finished"
    );

    Ok(IngestOutcome { run_id, summary })
}

/// Applies the loader to each record in order and returns the counters.
/// Per-record failures never escape; they are logged and counted.
pub(crate) fn ingest_records(
    connection: &mut Connection,
    db_path: &Path,
    records: &[Value],
    options: &IngestOptions,
) -> IngestSummary {
    let progress_every = options.progress_every.max(1) as i64;
    let mut summary = IngestSummary {
        records_read: records.len() as i64,
        ..IngestSummary::default()
    };

    for (index, value) in records.iter().enumerate() {
        let external_id = record_label(value, index);
        match ingest_one(connection, db_path, value, options.line_item_policy) {
            Ok(RecordOutcome::Persisted(outcome)) => {
                summary.processed += 1;
                debug!(
                    external_id = %external_id,
                    document_id = %outcome.document_id,
                    invoice_id = %outcome.invoice_id,
                    vendor_id = ?outcome.vendor_id,
                    customer_id = ?outcome.customer_id,
                    invoice_created = outcome.invoice_created,
                    line_items = outcome.line_items_written,
                    "record ingested"
                );
                if summary.processed % progress_every == 0 {
                    info!(
                        processed = summary.processed,
                        total = summary.records_read,
                        "ingestion progress"
                    );
                }
            }
            Ok(RecordOutcome::Skipped) => {
                summary.skipped += 1;
                warn!(external_id = %external_id, "skipping record without extracted data");
            }
            Err(record_error) => {
                summary.errors += 1;
                error!(
                    external_id = %external_id,
                    code = record_error.code(),
                    error = %record_error,
                    "failed to ingest record"
                );
                if summary.errors as usize > options.error_threshold {
                    summary.aborted = true;
                    error!(
                        errors = summary.errors,
                        threshold = options.error_threshold,
                        "too many errors, aborting batch"
                    );
                    break;
                }
            }
        }
    }

    summary
}

fn ingest_one(
    connection: &mut Connection,
    db_path: &Path,
    value: &Value,
    policy: LineItemPolicy,
) -> Result<RecordOutcome, RecordError> {
    let record = SourceRecord::deserialize(value)?;
    let timestamp = now_timestamp();
    let Some(normalized) = normalize_record(&record, &timestamp)? else {
        return Ok(RecordOutcome::Skipped);
    };

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;
    let outcome = persist_record(&transaction, db_path, &normalized, policy, &timestamp)?;
    transaction
        .commit()
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    Ok(RecordOutcome::Persisted(outcome))
}

fn record_label(value: &Value, index: usize) -> String {
    match value.get("_id") {
        Some(Value::String(id)) => id.clone(),
        _ => format!("#{}", index + 1),
    }
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}
