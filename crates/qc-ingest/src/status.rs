//! Completeness gate and JSON record loading.
//!
//! [`is_module_complete`] is the only branch deciding whether a report is
//! produced for a module. A `false` result means "skip silently"; callers
//! must not turn it into an error.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use qc_model::ModuleStatus;

use crate::error::{IngestError, Result};

/// Reads and parses a JSON record (status or descriptor).
///
/// # Errors
///
/// - [`IngestError::FileNotFound`] when `path` does not exist
/// - [`IngestError::Json`] when the content does not match `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a module status record.
pub fn read_module_status(path: &Path) -> Result<ModuleStatus> {
    read_json(path)
}

/// Returns the status record when the module completed, `None` otherwise.
///
/// # Errors
///
/// Fails with [`IngestError::FileNotFound`] when the status file is
/// missing and [`IngestError::Json`] when it is malformed.
pub fn completed_status(path: &Path) -> Result<Option<ModuleStatus>> {
    let status = read_module_status(path)?;
    let complete = status.is_complete();
    debug!(
        status_file = %path.display(),
        module = %status.module,
        status = %status.status,
        complete,
        "completeness gate"
    );
    Ok(complete.then_some(status))
}

/// Returns whether the module behind `path` finished successfully.
pub fn is_module_complete(path: &Path) -> Result<bool> {
    Ok(completed_status(path)?.is_some())
}
