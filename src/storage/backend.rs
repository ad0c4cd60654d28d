use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

use crate::Record;
use crate::Result;

/// Value exchanged with a backing storage.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedBlob {
    /// JSON-encoded record (stringify mode)
    Text(String),
    /// Structured record handed over as-is (raw mode)
    Raw(Record),
}

/// Blocking key-value backend, e.g. a local file or embedded database.
#[cfg_attr(test, automock)]
pub trait SyncStorage: Send + Sync + 'static {
    /// `Ok(None)` when nothing was saved under `key` yet.
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<SavedBlob>>;

    fn set_item(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()>;
}

/// Non-blocking key-value backend, e.g. a remote service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AsyncStorage: Send + Sync + 'static {
    /// `Ok(None)` when nothing was saved under `key` yet.
    async fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<SavedBlob>>;

    async fn set_item(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()>;
}

/// The two storage flavours, resolved once when the store is built.
#[derive(Clone)]
pub enum StorageBackend {
    Sync(Arc<dyn SyncStorage>),
    Async(Arc<dyn AsyncStorage>),
}

impl StorageBackend {
    /// Write `value` under `key`, awaiting the backend when it is async.
    pub(crate) async fn write(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()> {
        match self {
            StorageBackend::Sync(storage) => storage.set_item(key, value),
            StorageBackend::Async(storage) => storage.set_item(key, value).await,
        }
    }
}

impl fmt::Debug for StorageBackend {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            StorageBackend::Sync(_) => f.write_str("StorageBackend::Sync"),
            StorageBackend::Async(_) => f.write_str("StorageBackend::Async"),
        }
    }
}
