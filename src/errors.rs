//! Store Error Hierarchy
//!
//! Only real failures live here. Looking up something that is not there
//! (an unknown event, an observer that was already removed) is reported
//! through ordinary return values instead.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings or builder validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backing storage read/write failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Persisted payload could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Embedded sled database failures
    #[error(transparent)]
    DbError(#[from] sled::Error),

    /// Failure reported by a backend, e.g. undecodable stored bytes
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Asynchronous restore did not complete
    #[error("Restoring the persisted store failed: {0}")]
    RestoreFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON (de)serialization failures
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Stored payload decoded to something other than a flat record
    #[error("Persisted payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

impl Error {
    /// Build a configuration error from a plain message
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(ConfigError::Message(msg.into()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(CodecError::Json(e))
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::Storage(StorageError::DbError(e))
    }
}
