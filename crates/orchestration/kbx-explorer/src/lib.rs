//! kbx-explorer - filter-pushdown tree walks over Kafka backup storage.
//!
//! Kafka sink connectors write one object per topic partition and hour below
//! a `topic/year=/month=/day=/hour=/` hierarchy. This crate walks that
//! hierarchy for a time window, a topic allow-list and an optional content
//! search, pruning whole branches from what their keys imply. It provides:
//!
//! - [`PathSchema`] - partition and leaf key grammars
//! - [`range::RangeFilter`] - overlap checks for partially specified dates
//! - [`TreeWalker`] - concurrent, order-preserving recursive walk
//! - [`Explorer`] - the query entry point used by the HTTP and CLI layers
//! - [`storage`] - S3 and `object_store` backends
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kbx_explorer::{Explorer, ExplorerConfig, TreeQuery};
//! use kbx_explorer::storage::{S3Config, S3Storage};
//! use kbx_types::TopicFilter;
//!
//! let store = S3Storage::from_config(&S3Config::new("kafka-backup")).await?;
//! let explorer = Explorer::new(Arc::new(store), ExplorerConfig::default())?;
//!
//! let query = TreeQuery::new()
//!     .with_topics(TopicFilter::parse("orders,payments")?)
//!     .with_search_pattern("order_id\":42");
//!
//! let nodes = explorer.query_tree(query).await?;
//! println!("{}", serde_json::to_string_pretty(&nodes)?);
//! ```

pub mod config;
pub mod content;
pub mod query;
pub mod range;
pub mod schema;
pub mod stats;
pub mod storage;
pub mod walker;

#[cfg(test)]
mod testing;

pub use config::{
    ExplorerConfig, SchemaConfig, DEFAULT_LEAF_PATTERN, DEFAULT_PARTITION_PATTERN, DEFAULT_ROOT_KEY,
};
pub use content::{decode_content, SearchPattern};
pub use query::{Explorer, TreeQuery};
pub use schema::PathSchema;
pub use stats::WalkStats;
pub use walker::TreeWalker;
