//! Error types for the hostdir record store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be opened, created or read at startup.
    #[error("failed to open record file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The alias does not appear in any field of any record.
    #[error("{0} not found")]
    NotFound(String),

    /// The alias already resolves to a record.
    #[error("alias {alias} already bound to {host}")]
    AliasConflict { alias: String, host: String },

    /// The rewrite of the backing file failed. The in-memory change that
    /// triggered it stays applied.
    #[error("failed to persist records to {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether this is a lookup miss rather than a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
