use std::path::Path;

use rusqlite::{Connection, params};

use crate::ClientResult;
use crate::aggregate::collect_rows;
use crate::contracts::types::VendorSpend;
use crate::state::map_sqlite_error;

pub const TOP_VENDOR_LIMIT: i64 = 10;

/// Vendors ranked by summed invoice totals. Vendors without invoices count as
/// zero spend; equal totals keep insertion order.
pub fn top_vendors(connection: &Connection, db_path: &Path) -> ClientResult<Vec<VendorSpend>> {
    let mut statement = connection
        .prepare(
            "SELECT
                v.id,
                v.name,
                COALESCE(SUM(i.total_amount), 0) AS total_spend
             FROM vendors v
             LEFT JOIN invoices i ON i.vendor_id = v.id
             GROUP BY v.rowid, v.id, v.name
             ORDER BY total_spend DESC, v.rowid ASC
             LIMIT ?1",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows = statement
        .query_map(params![TOP_VENDOR_LIMIT], |row| {
            Ok(VendorSpend {
                vendor_id: row.get(0)?,
                vendor_name: row.get(1)?,
                total_spend: row.get(2)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    collect_rows(rows, db_path)
}
