use std::path::Path;

use rusqlite::Connection;

use crate::ClientResult;
use crate::aggregate::collect_rows;
use crate::contracts::types::TrendPoint;
use crate::state::map_sqlite_error;

/// Monthly invoice count and value. Stored dates are canonical UTC strings, so
/// the first seven characters are the zero-padded `YYYY-MM` bucket and string
/// order is chronological order.
pub fn invoice_trends(connection: &Connection, db_path: &Path) -> ClientResult<Vec<TrendPoint>> {
    let mut statement = connection
        .prepare(
            "SELECT
                substr(invoice_date, 1, 7) AS month,
                COUNT(*) AS invoice_count,
                COALESCE(SUM(total_amount), 0) AS total_value
             FROM invoices
             WHERE invoice_date IS NOT NULL
             GROUP BY month
             ORDER BY month ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows = statement
        .query_map([], |row| {
            Ok(TrendPoint {
                month: row.get(0)?,
                count: row.get(1)?,
                value: row.get(2)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    collect_rows(rows, db_path)
}
