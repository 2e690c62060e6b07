//! Recursive filter-pushdown walk over the backup hierarchy.
//!
//! Each listed level is classified against the [`PathSchema`]. Partitions
//! that fail the [`RangeFilter`] are pruned without being listed, so the
//! window and topic filters bound how much of the bucket is touched.
//! Siblings are visited concurrently but reported in listing order.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use kbx_error::{KbxError, Result};
use kbx_traits::{BackupStore, EntryKind, ListEntry};
use kbx_types::{StorageNode, TimeWindow, TopicFilter};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, error, trace};

use crate::config::ExplorerConfig;
use crate::content::{decode_content, SearchPattern};
use crate::range::{RangeFilter, Verdict};
use crate::schema::PathSchema;
use crate::stats::WalkStats;

/// Characters of matched content included in trace logs.
const PREVIEW_CHARS: usize = 400;

/// Filters and storage-call permits for one walk.
struct WalkContext {
    filter: RangeFilter,
    search: Option<SearchPattern>,
    permits: Semaphore,
}

/// Walks a backup store below a root key, pruning by time window and topic.
pub struct TreeWalker {
    store: Arc<dyn BackupStore>,
    schema: Arc<PathSchema>,
    max_concurrent_requests: usize,
    max_parallel_branches: usize,
}

impl TreeWalker {
    /// Create a walker over `store`.
    ///
    /// `max_concurrent_requests` bounds in-flight storage calls within each
    /// walk and `max_parallel_branches` bounds siblings visited at once per
    /// level. Concurrent walks do not share permits.
    pub fn new(store: Arc<dyn BackupStore>, schema: Arc<PathSchema>, config: &ExplorerConfig) -> Self {
        Self {
            store,
            schema,
            max_concurrent_requests: config.max_concurrent_requests.max(1),
            max_parallel_branches: config.max_parallel_branches.max(1),
        }
    }

    /// Walk the hierarchy below `root_key` and return the surviving nodes.
    ///
    /// Without a search pattern only partitions are returned. With one, data
    /// files inside the window whose content matches are returned as well.
    ///
    /// # Errors
    ///
    /// Fails only when `root_key` itself cannot be listed. Failures below the
    /// root are logged and the affected entry is left out.
    pub async fn walk(
        &self,
        root_key: &str,
        window: TimeWindow,
        topics: TopicFilter,
        search: Option<SearchPattern>,
    ) -> Result<Vec<StorageNode>> {
        let (nodes, _) = self.walk_with_stats(root_key, window, topics, search).await?;
        Ok(nodes)
    }

    /// Like [`walk`](Self::walk), also returning walk statistics.
    pub async fn walk_with_stats(
        &self,
        root_key: &str,
        window: TimeWindow,
        topics: TopicFilter,
        search: Option<SearchPattern>,
    ) -> Result<(Vec<StorageNode>, WalkStats)> {
        let ctx = WalkContext {
            filter: RangeFilter::new(window, topics),
            search,
            permits: Semaphore::new(self.max_concurrent_requests),
        };
        let mut stats = WalkStats::new();

        debug!(
            root_key,
            window = %ctx.filter.window(),
            topics = %ctx.filter.topics(),
            search = ctx.search.as_ref().map(|s| s.pattern()),
            "Starting tree walk"
        );

        let (nodes, level_stats) = self.walk_level(root_key, &ctx).await?;
        stats.merge(level_stats);
        stats.complete();

        debug!(
            root_key,
            levels_listed = stats.levels_listed,
            partitions_accepted = stats.partitions_accepted,
            partitions_pruned = stats.partitions_pruned,
            files_scanned = stats.files_scanned,
            files_matched = stats.files_matched,
            errors = stats.error_count(),
            "Tree walk completed"
        );

        Ok((nodes, stats))
    }

    /// List one level and visit its entries.
    fn walk_level<'a>(
        &'a self,
        key: &'a str,
        ctx: &'a WalkContext,
    ) -> BoxFuture<'a, Result<(Vec<StorageNode>, WalkStats)>> {
        async move {
            // Some stores list a directory marker equal to the prefix itself
            let entries: Vec<ListEntry> = self
                .list(key, ctx)
                .await?
                .into_iter()
                .filter(|entry| entry.key != key)
                .collect();
            let mut stats = WalkStats {
                levels_listed: 1,
                ..Default::default()
            };

            let visits: Vec<(Option<StorageNode>, WalkStats)> = stream::iter(entries)
                .map(|entry| self.visit(entry, ctx))
                .buffered(self.max_parallel_branches)
                .collect()
                .await;

            let mut nodes = Vec::with_capacity(visits.len());
            for (node, entry_stats) in visits {
                stats.merge(entry_stats);
                nodes.extend(node);
            }

            Ok((nodes, stats))
        }
        .boxed()
    }

    async fn visit(&self, entry: ListEntry, ctx: &WalkContext) -> (Option<StorageNode>, WalkStats) {
        match entry.kind {
            EntryKind::Partition => self.visit_partition(&entry.key, ctx).await,
            EntryKind::Leaf => self.visit_leaf(&entry.key, ctx).await,
        }
    }

    async fn visit_partition(&self, key: &str, ctx: &WalkContext) -> (Option<StorageNode>, WalkStats) {
        let mut stats = WalkStats::default();

        let Some(partition) = self.schema.match_partition(key) else {
            debug!(key, "Entry does not match the partition pattern, skipping");
            stats.entries_skipped += 1;
            return (None, stats);
        };

        match ctx.filter.check_partition(&partition) {
            Verdict::Accept => {}
            Verdict::Malformed(component) => {
                debug!(key, %component, "Partition component is not a valid date part, skipping");
                stats.entries_skipped += 1;
                return (None, stats);
            }
            verdict => {
                debug!(
                    key,
                    ?verdict,
                    window = %ctx.filter.window(),
                    topics = %ctx.filter.topics(),
                    "Partition pruned"
                );
                stats.partitions_pruned += 1;
                return (None, stats);
            }
        }

        match self.walk_level(key, ctx).await {
            Ok((children, child_stats)) => {
                stats.partitions_accepted += 1;
                stats.merge(child_stats);
                (Some(StorageNode::directory(key, children)), stats)
            }
            Err(e) => {
                error!(key, error = %e, "Failed to list partition, skipping");
                stats.record_error(format!("list {key}: {e}"));
                (None, stats)
            }
        }
    }

    async fn visit_leaf(&self, key: &str, ctx: &WalkContext) -> (Option<StorageNode>, WalkStats) {
        let mut stats = WalkStats::default();

        let Some(search) = &ctx.search else {
            trace!(key, "No search pattern, data file not scanned");
            return (None, stats);
        };

        let Some(leaf) = self.schema.match_leaf(key) else {
            debug!(key, "Entry does not match the leaf pattern, skipping");
            stats.entries_skipped += 1;
            return (None, stats);
        };

        if !ctx.filter.in_range(leaf.represented_time, &leaf.topic) {
            debug!(key, represented_time = %leaf.represented_time, "Data file outside filters");
            stats.files_pruned += 1;
            return (None, stats);
        }

        let raw = match self.fetch(key, ctx).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(key, error = %e, "Failed to fetch data file, skipping");
                stats.record_error(format!("fetch {key}: {e}"));
                return (None, stats);
            }
        };
        stats.record_scanned(raw.len() as u64);

        let content = match decode_content(&raw).await {
            Ok(content) => content,
            Err(e) => {
                error!(key, error = %e, "Failed to decode data file, skipping");
                stats.record_error(format!("decode {key}: {e}"));
                return (None, stats);
            }
        };

        if !search.is_match(&content) {
            debug!(key, pattern = search.pattern(), "Content does not match");
            return (None, stats);
        }

        stats.files_matched += 1;
        debug!(
            key,
            topic = %leaf.topic,
            file_name = %leaf.file_name,
            represented_time = %leaf.represented_time,
            "Data file matched"
        );
        trace!(key, preview = %preview(&content), "Matched content");

        let node = StorageNode::data_file(
            key,
            leaf.topic,
            leaf.file_name,
            leaf.represented_time,
            content,
        );
        (Some(node), stats)
    }

    async fn list(&self, prefix: &str, ctx: &WalkContext) -> Result<Vec<ListEntry>> {
        let _permit = acquire(ctx).await?;
        trace!(prefix, "Listing children");
        self.store.list_children(prefix).await
    }

    async fn fetch(&self, key: &str, ctx: &WalkContext) -> Result<bytes::Bytes> {
        let _permit = acquire(ctx).await?;
        trace!(key, "Fetching data file");
        self.store.fetch_content(key).await
    }
}

async fn acquire(ctx: &WalkContext) -> Result<SemaphorePermit<'_>> {
    ctx.permits
        .acquire()
        .await
        .map_err(|e| KbxError::Other(anyhow::anyhow!("Failed to acquire semaphore: {e}")))
}

fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}
