//! Configuration types for the explorer.

use kbx_error::{KbxError, Result};
use serde::{Deserialize, Serialize};

/// Partition grammar of the Kafka Connect S3/Blob sink layout.
///
/// Every group is optional so that each directory level matches:
/// `topics/`, `topics/orders/`, `topics/orders/year=2023/`, ...
pub const DEFAULT_PARTITION_PATTERN: &str = r"([a-zA-Z_0-9-]*)/?(?P<topic>[a-zA-Z_0-9-]*)?/?(year=(?P<year>\d+))?/?(month=(?P<month>\d+))?/?(day=(?P<day>\d+))?/?(hour=(?P<hour>\d+))?/";

/// Data file grammar of the Kafka Connect S3/Blob sink layout.
pub const DEFAULT_LEAF_PATTERN: &str = r"([a-zA-Z_0-9-]+)/(?P<topic>[a-zA-Z_0-9-]+)/year=(?P<year>\d+)/month=(?P<month>\d+)/day=(?P<day>\d+)/hour=(?P<hour>\d+)/(?P<fileName>[a-zA-Z_0-9+.-]+)";

/// Default root key of the backup tree.
pub const DEFAULT_ROOT_KEY: &str = "topics/";

/// The two key grammars used to classify listed entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Pattern for partition (directory) keys
    pub partition_pattern: String,

    /// Pattern for data file keys
    pub leaf_pattern: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            partition_pattern: DEFAULT_PARTITION_PATTERN.to_string(),
            leaf_pattern: DEFAULT_LEAF_PATTERN.to_string(),
        }
    }
}

impl SchemaConfig {
    /// Create a schema configuration with the default grammars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partition pattern.
    pub fn with_partition_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.partition_pattern = pattern.into();
        self
    }

    /// Set the leaf pattern.
    pub fn with_leaf_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.leaf_pattern = pattern.into();
        self
    }
}

/// Configuration for an explorer instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Key the tree walk starts from
    pub root_key: String,

    /// Key grammars
    pub schema: SchemaConfig,

    /// Maximum concurrent storage calls (list + fetch) per request
    pub max_concurrent_requests: usize,

    /// Maximum sibling entries visited concurrently per level
    pub max_parallel_branches: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_string(),
            schema: SchemaConfig::default(),
            max_concurrent_requests: 10,
            max_parallel_branches: 8,
        }
    }
}

impl ExplorerConfig {
    /// Create a new explorer configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root key.
    pub fn with_root_key(mut self, root_key: impl Into<String>) -> Self {
        self.root_key = root_key.into();
        self
    }

    /// Set the key grammars.
    pub fn with_schema(mut self, schema: SchemaConfig) -> Self {
        self.schema = schema;
        self
    }

    /// Set the maximum concurrent storage calls.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Set the maximum sibling entries visited concurrently.
    pub fn with_max_parallel_branches(mut self, max: usize) -> Self {
        self.max_parallel_branches = max;
        self
    }

    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_requests == 0 {
            return Err(KbxError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.max_parallel_branches == 0 {
            return Err(KbxError::Config(
                "max_parallel_branches must be at least 1".to_string(),
            ));
        }
        if self.schema.partition_pattern.trim().is_empty() || self.schema.leaf_pattern.trim().is_empty() {
            return Err(KbxError::Config("key patterns must not be blank".to_string()));
        }
        Ok(())
    }
}
