//! Storage collaborator traits and listing types.

use async_trait::async_trait;
use bytes::Bytes;
use kbx_error::Result;

/// What a listed key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A common prefix (pseudo-directory)
    Partition,
    /// An object
    Leaf,
}

/// One entry returned by a hierarchical listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full storage key; partition keys end with `/`
    pub key: String,

    /// Whether the key is a partition or a leaf
    pub kind: EntryKind,
}

impl ListEntry {
    /// Create a partition entry.
    pub fn partition(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::Partition,
        }
    }

    /// Create a leaf entry.
    pub fn leaf(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::Leaf,
        }
    }
}

/// Hierarchical, non-recursive listing of a storage prefix.
///
/// Keys sharing the next `/` separator below `prefix` are grouped into one
/// [`EntryKind::Partition`] entry. The returned order is the order the
/// explorer reports results in.
#[async_trait]
pub trait StorageLister: Send + Sync {
    /// Lists the direct children of `prefix`.
    async fn list_children(&self, prefix: &str) -> Result<Vec<ListEntry>>;
}

/// Reads the raw content of a leaf object.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetches the full content of `key`.
    async fn fetch_content(&self, key: &str) -> Result<Bytes>;
}

/// A storage backend usable by the explorer.
pub trait BackupStore: StorageLister + ContentFetcher {}

impl<T: StorageLister + ContentFetcher> BackupStore for T {}
