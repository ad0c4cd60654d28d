use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::Result;
use crate::SavedBlob;
use crate::StorageError;
use crate::SyncStorage;

/// Sled tree holding the persisted record
const STORE_TREE: &str = "_fluxible_store";

/// Blocking backend on top of an embedded sled database.
///
/// Values are kept as JSON text: a [`SavedBlob::Raw`] record is serialized on
/// write and comes back as [`SavedBlob::Text`] on read.
#[derive(Clone)]
pub struct SledStorage {
    tree: sled::Tree,
}

impl std::fmt::Debug for SledStorage {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledStorage")
            .field("tree_len", &self.tree.len())
            .finish()
    }
}

impl SledStorage {
    /// Open (or create) the database under `db_path`
    pub fn open(db_path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        debug!("SledStorage::open from path: {:?}", &db_path);

        let db = sled::Config::default()
            .path(db_path.as_ref())
            .use_compression(true)
            .compression_factor(1)
            .open()
            .map_err(|e| {
                warn!("Try to open DB at this location: {:?} and failed: {:?}", db_path, e);
                e
            })?;

        Self::from_db(&db)
    }

    /// Reuse an already opened database
    pub fn from_db(db: &sled::Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree(STORE_TREE)?,
        })
    }

    /// Flush dirty buffers to disk. Returns the number of bytes flushed.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.tree.flush()?)
    }
}

impl SyncStorage for SledStorage {
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<SavedBlob>> {
        let Some(ivec) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };

        let text = String::from_utf8(ivec.to_vec()).map_err(|e| {
            warn!(key, "Stored value is not valid UTF-8: {:?}", e);
            StorageError::Backend(format!("value under {key} is not valid UTF-8: {e}"))
        })?;
        Ok(Some(SavedBlob::Text(text)))
    }

    fn set_item(
        &self,
        key: &str,
        value: SavedBlob,
    ) -> Result<()> {
        let text = match value {
            SavedBlob::Text(text) => text,
            SavedBlob::Raw(record) => serde_json::to_string(&record)?,
        };

        self.tree.insert(key.as_bytes(), text.as_bytes())?;
        Ok(())
    }
}
