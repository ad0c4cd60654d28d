use std::fmt;
use std::sync::Arc;

use crate::AsyncStorage;
use crate::Record;
use crate::StorageBackend;
use crate::SyncStorage;

/// Picks the persisted subset out of the restored record.
///
/// Receives the initial store merged with whatever was saved, returns the
/// fields that should be persistence-tracked. The returned fields overwrite
/// the store and their names become the persisted key set.
pub type RestoreFn = Arc<dyn Fn(Record) -> Record + Send + Sync>;

/// How (and whether) the store is persisted.
#[derive(Clone)]
pub struct PersistConfig {
    pub backend: StorageBackend,
    pub restore: RestoreFn,
    /// Store JSON text (`true`, default) or the raw record (`false`)
    pub stringify: bool,
}

impl PersistConfig {
    pub fn sync<S, F>(
        storage: Arc<S>,
        restore: F,
    ) -> Self
    where
        S: SyncStorage,
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        Self {
            backend: StorageBackend::Sync(storage),
            restore: Arc::new(restore),
            stringify: true,
        }
    }

    pub fn with_async<S, F>(
        storage: Arc<S>,
        restore: F,
    ) -> Self
    where
        S: AsyncStorage,
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        Self {
            backend: StorageBackend::Async(storage),
            restore: Arc::new(restore),
            stringify: true,
        }
    }

    pub fn stringify(
        mut self,
        stringify: bool,
    ) -> Self {
        self.stringify = stringify;
        self
    }
}

impl fmt::Debug for PersistConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("PersistConfig")
            .field("backend", &self.backend)
            .field("stringify", &self.stringify)
            .finish_non_exhaustive()
    }
}
