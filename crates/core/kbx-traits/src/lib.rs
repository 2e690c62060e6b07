//! Core traits for the Kafka backup explorer.
//!
//! This crate defines the only boundary the explorer engine depends on:
//! - [`StorageLister`] - one-level hierarchical listing of a prefix
//! - [`ContentFetcher`] - full content of one object
//! - [`BackupStore`] - both of the above, implemented automatically

pub mod storage;

pub use storage::*;
