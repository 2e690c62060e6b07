//! Statistics for tree walks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Statistics collected during one tree walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkStats {
    /// When the walk started
    pub started_at: Option<DateTime<Utc>>,

    /// When the walk completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Directory levels listed
    pub levels_listed: usize,

    /// Partitions accepted and descended into
    pub partitions_accepted: usize,

    /// Partitions pruned by the time window or topic filter
    pub partitions_pruned: usize,

    /// Entries matching neither grammar
    pub entries_skipped: usize,

    /// Data files outside the time window or topic filter
    pub files_pruned: usize,

    /// Data files fetched and decoded
    pub files_scanned: usize,

    /// Data files whose content matched the search pattern
    pub files_matched: usize,

    /// Compressed bytes fetched
    pub bytes_fetched: u64,

    /// Per-entry errors that were skipped
    pub errors: Vec<String>,
}

impl WalkStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the walk as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record the counters of a subtree walk. Timestamps are kept.
    pub fn merge(&mut self, other: WalkStats) {
        self.levels_listed += other.levels_listed;
        self.partitions_accepted += other.partitions_accepted;
        self.partitions_pruned += other.partitions_pruned;
        self.entries_skipped += other.entries_skipped;
        self.files_pruned += other.files_pruned;
        self.files_scanned += other.files_scanned;
        self.files_matched += other.files_matched;
        self.bytes_fetched += other.bytes_fetched;
        self.errors.extend(other.errors);
    }

    /// Record a fetched data file.
    pub fn record_scanned(&mut self, size_bytes: u64) {
        self.files_scanned += 1;
        self.bytes_fetched += size_bytes;
    }

    /// Record an error.
    pub fn record_error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }

    /// Get the duration of the walk.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
