//! Read-side rollups for the dashboard. Every query is independent, reads
//! only committed rows, and returns an empty collection on an empty store.

pub mod cash_outflow;
pub mod categories;
pub mod invoices;
pub mod stats;
pub mod trends;
pub mod vendors;

use std::path::Path;

use rusqlite::{MappedRows, Row};

use crate::ClientResult;
use crate::state::map_sqlite_error;

pub(crate) fn collect_rows<T, F>(rows: MappedRows<'_, F>, db_path: &Path) -> ClientResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut collected = Vec::new();
    for row in rows {
        collected.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(collected)
}
