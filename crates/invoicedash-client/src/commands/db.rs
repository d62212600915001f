use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::ClientResult;
use crate::commands::open_store;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{SampleInvoice, StoreStatusData, TableCounts};
use crate::state::map_sqlite_error;

pub fn status() -> ClientResult<SuccessEnvelope> {
    status_with_home_override(None)
}

#[doc(hidden)]
pub fn status_with_home_override(home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    let store = open_store(home_override)?;
    let counts = table_counts(&store.connection, &store.db_path)?;
    let sample_invoice = sample_invoice(&store.connection, &store.db_path)?;
    let data = StoreStatusData {
        home: store.setup.home,
        db_path: store.setup.db_path,
        schema_version: store.setup.schema_version,
        counts,
        sample_invoice,
    };
    success("db status", data)
}

pub(crate) fn table_counts(connection: &Connection, db_path: &Path) -> ClientResult<TableCounts> {
    connection
        .query_row(
            "SELECT
                (SELECT COUNT(*) FROM documents),
                (SELECT COUNT(*) FROM vendors),
                (SELECT COUNT(*) FROM customers),
                (SELECT COUNT(*) FROM invoices),
                (SELECT COUNT(*) FROM payments),
                (SELECT COUNT(*) FROM line_items)",
            [],
            |row| {
                Ok(TableCounts {
                    documents: row.get(0)?,
                    vendors: row.get(1)?,
                    customers: row.get(2)?,
                    invoices: row.get(3)?,
                    payments: row.get(4)?,
                    line_items: row.get(5)?,
                })
            },
        )
        .map_err(|error| map_sqlite_error(db_path, &error))
}

/// The earliest-ingested invoice with its vendor and line-item count.
fn sample_invoice(connection: &Connection, db_path: &Path) -> ClientResult<Option<SampleInvoice>> {
    connection
        .query_row(
            "SELECT
                i.id,
                i.invoice_number,
                i.total_amount,
                v.name,
                (SELECT COUNT(*) FROM line_items li WHERE li.invoice_id = i.id)
             FROM invoices i
             LEFT JOIN vendors v ON v.id = i.vendor_id
             ORDER BY i.rowid ASC
             LIMIT 1",
            [],
            |row| {
                Ok(SampleInvoice {
                    id: row.get(0)?,
                    invoice_number: row.get(1)?,
                    total_amount: row.get(2)?,
                    vendor_name: row.get(3)?,
                    line_item_count: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}
