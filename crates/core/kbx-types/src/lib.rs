//! Core types for the Kafka backup explorer.
//!
//! This crate defines the data model shared by the explorer engine and its
//! boundary layers:
//! - [`Component`], [`PartitionMatch`], [`LeafMatch`] - what a storage key says about itself
//! - [`TimeWindow`], [`TopicFilter`] - the request filters
//! - [`StorageNode`] - the result tree

pub mod component;
pub mod node;
pub mod window;

pub use component::{Component, LeafMatch, PartitionMatch};
pub use node::{DataFileNode, DirectoryNode, StorageNode};
pub use window::{parse_date_time, TimeWindow, TopicFilter};
