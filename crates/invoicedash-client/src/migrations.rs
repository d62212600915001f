use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");
const ADD_INGEST_RUNS_SQL: &str = include_str!("migrations/0002_ingest_runs.sql");

pub const REQUIRED_INDEX_NAMES: [&str; 6] = [
    "idx_invoices_invoice_date",
    "idx_invoices_vendor_id",
    "idx_payments_due_date",
    "idx_line_items_invoice_id",
    "idx_line_items_category",
    "idx_ingest_runs_started_at_desc",
];

pub const SCHEMA_VERSION: &str = "v1";

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    migrations().to_latest(conn)
}

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(BOOTSTRAP_SQL), M::up(ADD_INGEST_RUNS_SQL)])
}
