//! Backend over the `object_store` abstraction.

use std::path::Path as FsPath;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use kbx_error::{KbxError, Result, StorageError};
use kbx_traits::{ContentFetcher, ListEntry, StorageLister};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::debug;

/// Backup store over any [`ObjectStore`].
///
/// Keys are relative to the store root, e.g. `topics/orders/year=2023/`.
#[derive(Debug, Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreStorage {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// A store rooted at a local directory.
    pub fn local(root: impl AsRef<FsPath>) -> Result<Self> {
        let root = root.as_ref();
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            KbxError::Config(format!("Invalid local root '{}': {}", root.display(), e))
        })?;
        Ok(Self::new(Arc::new(store)))
    }

    /// An empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    /// The underlying object store.
    pub fn inner(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

#[async_trait]
impl StorageLister for ObjectStoreStorage {
    async fn list_children(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        let list_error = |message: String| StorageError::List {
            prefix: prefix.to_string(),
            message,
        };

        let trimmed = prefix.trim_end_matches('/');
        let path = if trimmed.is_empty() {
            None
        } else {
            Some(ObjectPath::parse(trimmed).map_err(|e| list_error(e.to_string()))?)
        };

        let listing = self
            .store
            .list_with_delimiter(path.as_ref())
            .await
            .map_err(|e| list_error(e.to_string()))?;

        let mut entries: Vec<ListEntry> = listing
            .common_prefixes
            .iter()
            .map(|p| ListEntry::partition(format!("{p}/")))
            .chain(
                listing
                    .objects
                    .iter()
                    .map(|meta| ListEntry::leaf(meta.location.to_string())),
            )
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(prefix, entry_count = entries.len(), "Listed prefix");
        Ok(entries)
    }
}

#[async_trait]
impl ContentFetcher for ObjectStoreStorage {
    async fn fetch_content(&self, key: &str) -> Result<Bytes> {
        let fetch_error = |message: String| StorageError::Fetch {
            key: key.to_string(),
            message,
        };

        let path = ObjectPath::parse(key).map_err(|e| fetch_error(e.to_string()))?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        result.bytes().await.map_err(|e| fetch_error(e.to_string()).into())
    }
}
