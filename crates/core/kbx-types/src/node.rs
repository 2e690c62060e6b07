//! The result tree returned by a backup query.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A node of the backup tree.
///
/// Serializes as an untagged union: directories carry `name` and `children`,
/// data files carry `name`, `topic`, `fileName`, `representedTime` and
/// `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageNode {
    /// A partition that passed the filters
    Directory(DirectoryNode),
    /// A data file whose content matched the search pattern
    DataFile(DataFileNode),
}

/// A partition (pseudo-directory) node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Full storage key of the partition
    pub name: String,

    /// Surviving children, in listing order (may be empty)
    pub children: Vec<StorageNode>,
}

/// A data file node with its decompressed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFileNode {
    /// Full storage key of the file
    pub name: String,

    /// Topic captured from the key
    pub topic: String,

    /// File name captured from the key
    pub file_name: String,

    /// Hour the file represents
    #[serde(with = "represented_time")]
    pub represented_time: NaiveDateTime,

    /// Decompressed file content
    pub content: String,
}

impl StorageNode {
    /// Create a directory node.
    pub fn directory(name: impl Into<String>, children: Vec<StorageNode>) -> Self {
        StorageNode::Directory(DirectoryNode {
            name: name.into(),
            children,
        })
    }

    /// Create a data file node.
    pub fn data_file(
        name: impl Into<String>,
        topic: impl Into<String>,
        file_name: impl Into<String>,
        represented_time: NaiveDateTime,
        content: impl Into<String>,
    ) -> Self {
        StorageNode::DataFile(DataFileNode {
            name: name.into(),
            topic: topic.into(),
            file_name: file_name.into(),
            represented_time,
            content: content.into(),
        })
    }

    /// The storage key of this node.
    pub fn name(&self) -> &str {
        match self {
            StorageNode::Directory(d) => &d.name,
            StorageNode::DataFile(f) => &f.name,
        }
    }

    /// Children of a directory; empty for data files.
    pub fn children(&self) -> &[StorageNode] {
        match self {
            StorageNode::Directory(d) => &d.children,
            StorageNode::DataFile(_) => &[],
        }
    }

    /// Data file nodes in this subtree, depth first.
    pub fn data_files(&self) -> Vec<&DataFileNode> {
        let mut files = Vec::new();
        self.collect_data_files(&mut files);
        files
    }

    fn collect_data_files<'a>(&'a self, files: &mut Vec<&'a DataFileNode>) {
        match self {
            StorageNode::DataFile(f) => files.push(f),
            StorageNode::Directory(d) => {
                for child in &d.children {
                    child.collect_data_files(files);
                }
            }
        }
    }

    /// Find a node by storage key in this subtree.
    pub fn find(&self, name: &str) -> Option<&StorageNode> {
        if self.name() == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(name))
    }
}

/// ISO-8601 date-time at minute precision (`2023-11-03T15:00`).
mod represented_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
