use std::path::Path;

use crate::ClientResult;
use crate::commands::open_store;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::export::export_csv;

pub fn csv(directory: &Path) -> ClientResult<SuccessEnvelope> {
    csv_with_home_override(directory, None)
}

#[doc(hidden)]
pub fn csv_with_home_override(
    directory: &Path,
    home_override: Option<&Path>,
) -> ClientResult<SuccessEnvelope> {
    let store = open_store(home_override)?;
    let data = export_csv(&store.connection, &store.db_path, directory)?;
    success("export csv", data)
}
