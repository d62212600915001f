use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Error as SqliteError, ffi::ErrorCode};

use crate::config::HOME_ENV;
use crate::{ClientError, ClientResult};

const DB_FILE_NAME: &str = "analytics.db";
const DEFAULT_HOME_DIR: &str = ".invoicedash";
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Where the analytics store lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub home: PathBuf,
    pub db_path: PathBuf,
}

impl StoreLocation {
    /// Picks the home directory: explicit override, then `INVOICEDASH_HOME`,
    /// then `~/.invoicedash`. Relative paths are anchored at the working
    /// directory so reported paths are stable.
    pub fn resolve(home_override: Option<&Path>) -> ClientResult<Self> {
        let home = match home_override {
            Some(path) => path.to_path_buf(),
            None => default_home()?,
        };
        let home = if home.is_absolute() {
            home
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&home))
                .map_err(|error| ClientError::store_init_failed(&home, &error.to_string()))?
        };
        let db_path = home.join(DB_FILE_NAME);
        Ok(Self { home, db_path })
    }

    /// Creates the home directory, owner-only on unix.
    pub fn prepare(&self) -> ClientResult<()> {
        fs::create_dir_all(&self.home).map_err(|error| map_io_error(&self.home, &error))?;
        restrict_to_owner(&self.home);
        Ok(())
    }

    pub fn connect(&self) -> ClientResult<Connection> {
        open_connection(&self.db_path)
    }
}

fn default_home() -> ClientResult<PathBuf> {
    if let Some(path) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    home::home_dir()
        .map(|path| path.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| {
            ClientError::store_init_failed(
                Path::new("."),
                "Could not resolve a home directory for the analytics store.",
            )
        })
}

/// Opens a read-write connection with a short busy timeout, foreign keys
/// enforced and the store's SQL functions registered.
pub fn open_connection(db_path: &Path) -> ClientResult<Connection> {
    let connection =
        Connection::open(db_path).map_err(|error| map_sqlite_error(db_path, &error))?;
    connection
        .busy_timeout(BUSY_TIMEOUT)
        .and_then(|()| connection.execute_batch("PRAGMA foreign_keys = ON;"))
        .and_then(|()| register_functions(&connection))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(connection)
}

/// `fold_case(text)` lowercases with full Unicode case mapping; SQLite's own
/// `lower()` and `LIKE` only fold ASCII. Non-text input yields NULL.
pub fn register_functions(connection: &Connection) -> rusqlite::Result<()> {
    connection.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            Ok(match context.get_raw(0) {
                ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
                _ => None,
            })
        },
    )
}

pub fn map_io_error(path: &Path, error: &std::io::Error) -> ClientError {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => {
            ClientError::store_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::store_init_failed(path, &error.to_string()),
    }
}

pub fn map_sqlite_error(path: &Path, error: &SqliteError) -> ClientError {
    match error.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => ClientError::store_locked(path),
        Some(ErrorCode::NotADatabase) => ClientError::store_corrupt(path),
        Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly) => {
            ClientError::store_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::store_init_failed(path, &error.to_string()),
    }
}

/// Mapping for failures while writing ingested rows. Lock, corruption and
/// permission problems keep their store codes; constraint, trigger and other
/// statement failures are write failures.
pub fn map_sqlite_write_error(path: &Path, error: &SqliteError) -> ClientError {
    match error.sqlite_error_code() {
        Some(
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::CannotOpen
            | ErrorCode::ReadOnly,
        ) => map_sqlite_error(path, error),
        _ => ClientError::store_write_failed(path, &error.to_string()),
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) {}
