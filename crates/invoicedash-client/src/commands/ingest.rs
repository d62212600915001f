use std::path::Path;

use crate::ClientResult;
use crate::commands::open_store;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{IngestData, IngestListData};
use crate::ingest::{self, IngestOptions, input};

#[derive(Debug, Default)]
pub struct IngestRunOptions<'a> {
    pub path: Option<String>,
    pub ingest: IngestOptions,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

#[derive(Debug, Default)]
pub struct IngestListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn run(path: Option<String>, options: IngestOptions) -> ClientResult<SuccessEnvelope> {
    run_with_options(IngestRunOptions {
        path,
        ingest: options,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: IngestRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let source = input::resolve_source(options.path.clone(), options.stdin_override)?;
    let mut store = open_store(options.home_override)?;
    let outcome = ingest::execute(&mut store.connection, &store.db_path, &source, &options.ingest)?;

    let summary = outcome.summary;
    let message = if summary.aborted {
        format!(
            "Ingestion aborted after {} errors. {} records were processed before stopping.",
            summary.errors, summary.processed
        )
    } else {
        format!(
            "Ingestion completed. Processed {}, skipped {}, errors {}.",
            summary.processed, summary.skipped, summary.errors
        )
    };

    let data = IngestData {
        run_id: outcome.run_id,
        path: options.path,
        source_kind: source.source_kind.as_str().to_string(),
        line_item_policy: options.ingest.line_item_policy.as_str().to_string(),
        message,
        summary,
    };
    success("ingest", data)
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(IngestListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: IngestListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let store = open_store(options.home_override)?;
    let rows = ingest::ledger::list_runs(&store.connection, &store.db_path)?;
    success("ingest list", IngestListData { rows })
}
