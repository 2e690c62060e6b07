//! Key grammars: classifying listed keys as partitions or data files.
//!
//! Both patterns are compiled once when the explorer is built and shared
//! read-only between requests. Patterns are matched against the whole key.

use kbx_error::{KbxError, Result};
use kbx_types::{Component, LeafMatch, PartitionMatch};
use regex::Regex;
use tracing::trace;

use crate::config::SchemaConfig;

/// Compiled partition and leaf grammars.
///
/// # Example
///
/// ```
/// use kbx_explorer::{PathSchema, SchemaConfig};
/// use kbx_types::Component;
///
/// let schema = PathSchema::compile(&SchemaConfig::default()).unwrap();
///
/// let m = schema.match_partition("topics/orders/year=2023/month=11/").unwrap();
/// assert_eq!(m.topic(), Some("orders"));
/// assert_eq!(m.get(Component::Month), Some("11"));
/// assert!(!m.contains(Component::Day));
/// ```
#[derive(Debug, Clone)]
pub struct PathSchema {
    partition: Regex,
    leaf: Regex,
}

impl PathSchema {
    /// Compile both grammars.
    ///
    /// # Errors
    ///
    /// Returns [`KbxError::Config`] if a pattern does not compile, or if the
    /// leaf pattern lacks one of the `topic`, `year`, `month`, `day`, `hour`,
    /// `fileName` groups.
    pub fn compile(config: &SchemaConfig) -> Result<Self> {
        let partition = compile_anchored("partition", &config.partition_pattern)?;
        let leaf = compile_anchored("leaf", &config.leaf_pattern)?;

        let leaf_groups: Vec<&str> = leaf.capture_names().flatten().collect();
        for component in Component::PARTITION.iter().chain([&Component::FileName]) {
            if !leaf_groups.contains(&component.group_name()) {
                return Err(KbxError::Config(format!(
                    "leaf pattern is missing the named group '{}'",
                    component.group_name()
                )));
            }
        }

        Ok(Self { partition, leaf })
    }

    /// Match a partition key against the partition grammar.
    ///
    /// Returns `None` when the key does not match, or when the captured date
    /// components skip a level (e.g. `month` without `year`).
    pub fn match_partition(&self, key: &str) -> Option<PartitionMatch> {
        let captures = self.partition.captures(key)?;

        let mut matched = PartitionMatch::new();
        for component in Component::PARTITION {
            if let Some(value) = captures.name(component.group_name()) {
                trace!(key, %component, value = value.as_str(), "Captured partition component");
                matched.insert(component, value.as_str());
            }
        }

        matched.is_hierarchical().then_some(matched)
    }

    /// Match a data file key against the leaf grammar.
    ///
    /// Returns `None` when the key does not match or its date components do
    /// not form a valid hour.
    pub fn match_leaf(&self, key: &str) -> Option<LeafMatch> {
        let captures = self.leaf.captures(key)?;
        let group = |component: Component| captures.name(component.group_name()).map(|m| m.as_str());

        LeafMatch::from_parts(
            group(Component::Topic)?,
            group(Component::FileName)?,
            group(Component::Year)?,
            group(Component::Month)?,
            group(Component::Day)?,
            group(Component::Hour)?,
        )
    }
}

/// Compile a pattern so that it must match the entire input.
fn compile_anchored(kind: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| KbxError::Config(format!("Invalid {kind} pattern '{pattern}': {e}")))
}
