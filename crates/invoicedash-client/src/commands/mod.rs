pub mod chat;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod health;
pub mod ingest;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::ClientResult;
use crate::setup::{SetupContext, initialize};

pub(crate) struct Store {
    pub(crate) setup: SetupContext,
    pub(crate) db_path: PathBuf,
    pub(crate) connection: Connection,
}

/// Initializes the store (directory, migrations, verification) and keeps the
/// connection for one command.
pub(crate) fn open_store(home_override: Option<&Path>) -> ClientResult<Store> {
    let (setup, connection) = initialize(home_override)?;
    let db_path = setup.db_path_buf();
    Ok(Store {
        setup,
        db_path,
        connection,
    })
}
