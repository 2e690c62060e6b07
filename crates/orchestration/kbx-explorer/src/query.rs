//! The query entry point used by the HTTP and CLI boundaries.

use std::sync::Arc;

use chrono::NaiveDateTime;
use kbx_error::Result;
use kbx_traits::BackupStore;
use kbx_types::{StorageNode, TimeWindow, TopicFilter};
use tracing::debug;

use crate::config::ExplorerConfig;
use crate::content::SearchPattern;
use crate::schema::PathSchema;
use crate::walker::TreeWalker;

/// Parameters of one tree query.
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    /// Topics to include
    pub topics: TopicFilter,

    /// Half-open time window
    pub window: TimeWindow,

    /// Content search pattern; without one no data files are returned
    pub search_pattern: Option<String>,
}

impl TreeQuery {
    /// Query everything below the root, directories only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(mut self, topics: TopicFilter) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Build the window from optional bounds.
    ///
    /// # Errors
    ///
    /// Returns [`kbx_error::KbxError::InvalidRequest`] if `from >= until`.
    pub fn with_bounds(
        mut self,
        from: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Result<Self> {
        self.window = TimeWindow::from_bounds(from, until)?;
        Ok(self)
    }

    pub fn with_search_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.search_pattern = Some(pattern.into());
        self
    }
}

/// Answers tree queries against one backup store.
///
/// The schema is compiled once here and shared by every query.
pub struct Explorer {
    walker: TreeWalker,
    root_key: String,
}

impl Explorer {
    /// Create an explorer, validating the configuration and compiling the
    /// key grammars.
    ///
    /// # Errors
    ///
    /// Returns [`kbx_error::KbxError::Config`] for invalid settings or patterns.
    pub fn new(store: Arc<dyn BackupStore>, config: ExplorerConfig) -> Result<Self> {
        config.validate()?;
        let schema = Arc::new(PathSchema::compile(&config.schema)?);

        Ok(Self {
            walker: TreeWalker::new(store, schema, &config),
            root_key: config.root_key,
        })
    }

    /// The storage key every query starts from.
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Run a query and return the surviving top-level nodes in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`kbx_error::KbxError::InvalidRequest`] for an uncompilable
    /// search pattern, or the storage error if the root cannot be listed.
    pub async fn query_tree(&self, query: TreeQuery) -> Result<Vec<StorageNode>> {
        let search = query
            .search_pattern
            .as_deref()
            .map(SearchPattern::new)
            .transpose()?;

        let (nodes, stats) = self
            .walker
            .walk_with_stats(&self.root_key, query.window, query.topics, search)
            .await?;

        debug!(
            root_key = %self.root_key,
            nodes = nodes.len(),
            files_matched = stats.files_matched,
            bytes_fetched = stats.bytes_fetched,
            duration_ms = stats.duration().map(|d| d.num_milliseconds()),
            "Query completed"
        );

        Ok(nodes)
    }
}
