use std::fs;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::info;

use crate::contracts::types::{ExportData, ExportedFile};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

/// Exported relations, in dependency order. Names are a fixed allowlist and
/// are interpolated into SQL only from here.
pub const EXPORT_TABLES: [&str; 6] = [
    "documents",
    "vendors",
    "customers",
    "invoices",
    "payments",
    "line_items",
];

/// Writes `<table>.csv` with a header row for every exported relation.
pub fn export_csv(connection: &Connection, db_path: &Path, directory: &Path) -> ClientResult<ExportData> {
    fs::create_dir_all(directory)
        .map_err(|error| ClientError::export_failed(directory, &error.to_string()))?;

    let mut files = Vec::with_capacity(EXPORT_TABLES.len());
    for table in EXPORT_TABLES {
        let path = directory.join(format!("{table}.csv"));
        let rows = export_table(connection, db_path, table, &path)?;
        info!(table, rows, path = %path.display(), "exported table");
        files.push(ExportedFile {
            table: table.to_string(),
            path: path.display().to_string(),
            rows,
        });
    }

    Ok(ExportData {
        directory: directory.display().to_string(),
        files,
    })
}

fn export_table(connection: &Connection, db_path: &Path, table: &str, path: &Path) -> ClientResult<i64> {
    let mut statement = connection
        .prepare(&format!("SELECT * FROM {table} ORDER BY rowid ASC"))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let headers = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<String>>();

    let mut writer = csv::Writer::from_path(path)
        .map_err(|error| ClientError::export_failed(path, &error.to_string()))?;
    writer
        .write_record(&headers)
        .map_err(|error| ClientError::export_failed(path, &error.to_string()))?;

    let mut rows = statement
        .query([])
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let mut written = 0_i64;
    while let Some(row) = rows.next().map_err(|error| map_sqlite_error(db_path, &error))? {
        let mut record = Vec::with_capacity(headers.len());
        for index in 0..headers.len() {
            let value = row
                .get_ref(index)
                .map_err(|error| map_sqlite_error(db_path, &error))?;
            record.push(csv_cell(value));
        }
        writer
            .write_record(&record)
            .map_err(|error| ClientError::export_failed(path, &error.to_string()))?;
        written += 1;
    }

    writer
        .flush()
        .map_err(|error| ClientError::export_failed(path, &error.to_string()))?;
    Ok(written)
}

fn csv_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(integer) => integer.to_string(),
        ValueRef::Real(real) => real.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).to_string(),
        ValueRef::Blob(blob) => format!("<{} bytes>", blob.len()),
    }
}
