use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use crate::AsyncStorage;
use crate::Result;
use crate::SavedBlob;
use crate::SyncStorage;

/// In-memory blocking backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, SavedBlob>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `value` under `key`
    pub fn with_item(
        key: &str,
        value: SavedBlob,
    ) -> Self {
        let storage = Self::new();
        storage.items.write().insert(key.to_string(), value);
        storage
    }

    /// Current value under `key`, without going through the trait
    pub fn item(
        &self,
        key: &str,
    ) -> Option<SavedBlob> {
        self.items.read().get(key).cloned()
    }
}

impl SyncStorage for MemoryStorage {
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<SavedBlob>> {
        Ok(self.item(key))
    }

    fn set_item(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()> {
        trace!(key, "MemoryStorage::set_item");
        self.items.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory non-blocking backend
#[derive(Debug, Default)]
pub struct AsyncMemoryStorage {
    inner: MemoryStorage,
}

impl AsyncMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(
        key: &str,
        value: SavedBlob,
    ) -> Self {
        Self {
            inner: MemoryStorage::with_item(key, value),
        }
    }

    pub fn item(
        &self,
        key: &str,
    ) -> Option<SavedBlob> {
        self.inner.item(key)
    }
}

#[async_trait]
impl AsyncStorage for AsyncMemoryStorage {
    async fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<SavedBlob>> {
        self.inner.get_item(key)
    }

    async fn set_item(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()> {
        self.inner.set_item(key, value)
    }
}
