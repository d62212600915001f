use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, params};

use crate::ClientResult;
use crate::aggregate::collect_rows;
use crate::contracts::types::CashOutflowPoint;
use crate::state::map_sqlite_error;

/// Inclusive calendar-day bounds on the payment due date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueDateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Summed invoice totals per payment due day, ascending. Invoices without a
/// payment or without a due date do not contribute.
pub fn cash_outflow(
    connection: &Connection,
    db_path: &Path,
    range: DueDateRange,
) -> ClientResult<Vec<CashOutflowPoint>> {
    let start = range.start.map(|day| day.format("%Y-%m-%d").to_string());
    let end = range.end.map(|day| day.format("%Y-%m-%d").to_string());

    let mut statement = connection
        .prepare(
            "SELECT
                substr(p.due_date, 1, 10) AS due_day,
                COALESCE(SUM(i.total_amount), 0) AS amount
             FROM invoices i
             JOIN payments p ON p.invoice_id = i.id
             WHERE p.due_date IS NOT NULL
               AND (?1 IS NULL OR substr(p.due_date, 1, 10) >= ?1)
               AND (?2 IS NULL OR substr(p.due_date, 1, 10) <= ?2)
             GROUP BY due_day
             ORDER BY due_day ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows = statement
        .query_map(params![start, end], |row| {
            Ok(CashOutflowPoint {
                date: row.get(0)?,
                amount: row.get(1)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    collect_rows(rows, db_path)
}
