//! Error types for preference persistence
//!
//! Classification and state updates never fail for well-formed input, so
//! the only fallible surface in this crate is the preference bridge.

use thiserror::Error;

/// Errors that can occur when persisting preferences.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying store could not be read or written
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Preference record could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No platform data directory is available on this system
    #[error("No platform data directory available")]
    NoDataDir,
}
