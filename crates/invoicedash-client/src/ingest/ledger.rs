use std::path::Path;

use rusqlite::{Connection, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::contracts::types::{IngestRunItem, IngestSummary};
use crate::state::{map_sqlite_error, map_sqlite_write_error};

pub(crate) fn start_run(
    connection: &Connection,
    db_path: &Path,
    source_kind: &str,
    source_ref: Option<&str>,
    started_at: &str,
) -> ClientResult<String> {
    let run_id = format!("run_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO ingest_runs (run_id, status, source_kind, source_ref, started_at)
             VALUES (?1, 'running', ?2, ?3, ?4)",
            params![&run_id, source_kind, source_ref, started_at],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;
    Ok(run_id)
}

pub(crate) fn finish_run(
    connection: &Connection,
    db_path: &Path,
    run_id: &str,
    summary: &IngestSummary,
    completed_at: &str,
) -> ClientResult<()> {
    let status = if summary.aborted { "aborted" } else { "completed" };
    connection
        .execute(
            "UPDATE ingest_runs
             SET status = ?2,
                 completed_at = ?3,
                 records_read = ?4,
                 processed = ?5,
                 skipped = ?6,
                 errors = ?7,
                 aborted = ?8
             WHERE run_id = ?1",
            params![
                run_id,
                status,
                completed_at,
                summary.records_read,
                summary.processed,
                summary.skipped,
                summary.errors,
                summary.aborted
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;
    Ok(())
}

/// Runs newest first. ULIDs sort by creation time, so they break ties between
/// runs started within the same second.
pub(crate) fn list_runs(connection: &Connection, db_path: &Path) -> ClientResult<Vec<IngestRunItem>> {
    let mut statement = connection
        .prepare(
            "SELECT
                run_id,
                status,
                source_kind,
                source_ref,
                started_at,
                completed_at,
                records_read,
                processed,
                skipped,
                errors,
                aborted
             FROM ingest_runs
             ORDER BY started_at DESC, run_id DESC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok(IngestRunItem {
                run_id: row.get(0)?,
                status: row.get(1)?,
                source_kind: row.get(2)?,
                source_ref: row.get(3)?,
                started_at: row.get(4)?,
                completed_at: row.get(5)?,
                records_read: row.get(6)?,
                processed: row.get(7)?,
                skipped: row.get(8)?,
                errors: row.get(9)?,
                aborted: row.get(10)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(rows)
}
