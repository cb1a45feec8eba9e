//! Leak Watcher Error Hierarchy
//!
//! User-facing validation errors carry the numeric codes the host API reports to callers.
//! Everything else is an internal failure that the watcher logs and degrades on.

use std::path::PathBuf;

use config::ConfigError;

use crate::constants::ERROR_CODE_CALLBACK_INVALID;
use crate::constants::ERROR_CODE_CONFIG_INVALID;
use crate::constants::ERROR_CODE_ENABLE_INVALID;
use crate::constants::ERROR_CODE_INVALID_PARAM;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or unusable required argument (object, message, path, enable flag)
    #[error("Parameter error. Please check! ({0})")]
    InvalidParameter(&'static str),

    /// `isEnabled` missing on `enable_leak_watcher`
    #[error("The parameter isEnabled invalid. Please check!")]
    EnableFlagInvalid,

    /// Malformed configuration object or unrecognized watch target
    #[error("The parameter config invalid. Please check! ({0})")]
    ConfigInvalid(String),

    /// Dump callback missing on `enable_leak_watcher`
    #[error("The parameter callback invalid. Please check!")]
    CallbackInvalid,

    /// Settings loading failures
    #[error(transparent)]
    Settings(#[from] ConfigError),

    /// Dump directory, manifest and retention failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Native snapshot primitive failures
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Running-process query failures
    #[error("Process state query failed: {0}")]
    Process(String),

    /// Tick scheduler could not be armed
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl Error {
    /// Numeric code reported to API callers.
    ///
    /// Internal failures never cross the API boundary, they share the generic parameter code.
    pub fn code(&self) -> i32 {
        match self {
            Error::EnableFlagInvalid => ERROR_CODE_ENABLE_INVALID,
            Error::ConfigInvalid(_) => ERROR_CODE_CONFIG_INVALID,
            Error::CallbackInvalid => ERROR_CODE_CALLBACK_INVALID,
            _ => ERROR_CODE_INVALID_PARAM,
        }
    }

    /// Whether the error is one of the validation errors raised at the API edge
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter(_)
                | Error::EnableFlagInvalid
                | Error::ConfigInvalid(_)
                | Error::CallbackInvalid
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures during dump/retention operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// I/O failure with the offending path attached
    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Manifest or leak list serialization failures
    #[error(transparent)]
    Manifest(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The native primitive reported a failure
    #[error("Heap dump failed: {0}")]
    DumpFailed(String),

    /// The primitive returned but produced no file
    #[error("Heap dump produced no file at {0}")]
    Missing(PathBuf),
}
