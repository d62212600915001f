use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::migrations::{REQUIRED_INDEX_NAMES, SCHEMA_VERSION, run_pending};
use crate::state::{StoreLocation, map_sqlite_error};
use crate::{ClientError, ClientResult};

/// Tables every command relies on, with the columns the queries touch.
const REQUIRED_TABLES: [(&str, &[&str]); 7] = [
    (
        "documents",
        &["id", "external_id", "name", "status", "is_validated", "created_at"],
    ),
    ("vendors", &["id", "name", "party_number"]),
    ("customers", &["id", "name", "party_number"]),
    (
        "invoices",
        &[
            "id",
            "document_id",
            "invoice_id",
            "invoice_number",
            "invoice_date",
            "total_amount",
            "currency",
            "vendor_id",
            "customer_id",
        ],
    ),
    ("payments", &["id", "invoice_id", "due_date", "status"]),
    ("line_items", &["id", "invoice_id", "total_price", "category"]),
    (
        "ingest_runs",
        &["run_id", "status", "started_at", "processed", "errors", "aborted"],
    ),
];

#[derive(Debug, Clone)]
pub struct SetupContext {
    pub home: String,
    pub db_path: String,
    pub schema_version: String,
}

impl SetupContext {
    pub fn db_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }
}

pub fn ensure_initialized() -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(None)
}

pub fn ensure_initialized_at(home_override: &Path) -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(Some(home_override))
}

pub fn ensure_initialized_with_home_override(
    home_override: Option<&Path>,
) -> ClientResult<SetupContext> {
    initialize(home_override).map(|(context, _connection)| context)
}

/// Prepares the store and returns the migrated connection alongside the
/// context, so callers keep using the same handle.
pub(crate) fn initialize(home_override: Option<&Path>) -> ClientResult<(SetupContext, Connection)> {
    let location = StoreLocation::resolve(home_override)?;
    location.prepare()?;

    let db_path = location.db_path.as_path();
    let mut connection = location.connect()?;
    run_pending(&mut connection).map_err(|error| map_migration_error(db_path, &error))?;
    verify_schema(&connection, db_path)?;
    let schema_version = read_schema_version(&connection, db_path)?;
    debug!(db_path = %db_path.display(), schema_version = %schema_version, "store ready");

    let context = SetupContext {
        home: location.home.display().to_string(),
        db_path: db_path.display().to_string(),
        schema_version,
    };
    Ok((context, connection))
}

/// Lock, corruption and permission problems keep their store codes; anything
/// else that breaks during migration is a migration failure.
fn map_migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> ClientError {
    if let rusqlite_migration::Error::RusqliteError { err, .. } = error {
        let mapped = map_sqlite_error(db_path, err);
        if matches!(
            mapped.code.as_str(),
            "store_locked" | "store_corrupt" | "store_init_permission_denied"
        ) {
            return mapped;
        }
    }
    ClientError::migration_failed(db_path, &error.to_string())
}

fn verify_schema(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    let objects = schema_objects(connection, db_path)?;

    for (table, required_columns) in REQUIRED_TABLES {
        if !objects.contains(&("table".to_string(), table.to_string())) {
            return Err(ClientError::store_corrupt(db_path));
        }
        let columns = table_columns(connection, table, db_path)?;
        if required_columns
            .iter()
            .any(|column| !columns.contains(*column))
        {
            return Err(ClientError::store_corrupt(db_path));
        }
    }

    if REQUIRED_INDEX_NAMES
        .iter()
        .any(|index| !objects.contains(&("index".to_string(), index.to_string())))
    {
        return Err(ClientError::store_corrupt(db_path));
    }

    Ok(())
}

fn schema_objects(connection: &Connection, db_path: &Path) -> ClientResult<HashSet<(String, String)>> {
    let mut statement = connection
        .prepare("SELECT type, name FROM sqlite_master WHERE type IN ('table', 'index')")
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows = statement
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    rows.collect::<Result<HashSet<_>, _>>()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn table_columns(connection: &Connection, table: &str, db_path: &Path) -> ClientResult<HashSet<String>> {
    let mut statement = connection
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows = statement
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    rows.collect::<Result<HashSet<_>, _>>()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn read_schema_version(connection: &Connection, db_path: &Path) -> ClientResult<String> {
    let value = connection
        .query_row(
            "SELECT value FROM internal_meta WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(value.unwrap_or_else(|| SCHEMA_VERSION.to_string()))
}
