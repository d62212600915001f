use std::path::Path;

use chrono::{Datelike, Utc};
use rusqlite::{Connection, params};

use crate::ClientResult;
use crate::contracts::types::StatsData;
use crate::state::map_sqlite_error;

pub fn current_year_stats(connection: &Connection, db_path: &Path) -> ClientResult<StatsData> {
    stats_for_year(connection, db_path, Utc::now().year())
}

/// Year-to-date headline numbers. Invoices are bounded by invoice date and
/// documents by creation time, both within `[Jan 1 00:00:00, Dec 31 23:59:59]`.
pub fn stats_for_year(connection: &Connection, db_path: &Path, year: i32) -> ClientResult<StatsData> {
    let year_start = format!("{year:04}-01-01T00:00:00Z");
    let year_end = format!("{year:04}-12-31T23:59:59Z");

    let (total_spend, total_invoices, average) = connection
        .query_row(
            "SELECT COALESCE(SUM(total_amount), 0), COUNT(*), AVG(total_amount)
             FROM invoices
             WHERE invoice_date >= ?1 AND invoice_date <= ?2",
            params![&year_start, &year_end],
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            },
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let documents_uploaded = connection
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE created_at >= ?1 AND created_at <= ?2",
            params![&year_start, &year_end],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(StatsData {
        total_spend,
        total_invoices,
        documents_uploaded,
        average_invoice_value: average.unwrap_or(0.0),
    })
}
