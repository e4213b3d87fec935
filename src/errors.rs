use thiserror::Error;

use crate::catalog::StoreKind;

/// Error raised by a [`crate::storage::PreferenceStore`] backend.
///
/// Storage failures propagate unchanged to the caller; the only reads that swallow
/// an absence are the documented defaulting accessors (missing counters read as 0).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file or directory could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The persisted snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// No per-user data directory is available on this system.
    #[error("no data directory available for the current user")]
    DataDirectoryUnavailable,
    /// A stored cell holds a different type than the caller requested.
    #[error("key {key}: expected {expected} value")]
    UnexpectedType {
        /// Key of the offending cell.
        key: String,
        /// Human-readable description of the expected type.
        expected: &'static str,
    },
}

/// Error raised when store resolution produces zero destinations.
///
/// A legitimate terminal outcome rather than a defect: it signals the host to skip
/// showing any store-open action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// None of the store's client packages is installed and the store offers no
    /// safe web fallback.
    #[error("no destination available for {0}")]
    NoDestinationAvailable(StoreKind),
}
