//! Path components extracted from partition and leaf keys.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

/// A named component of a backup key.
///
/// The declaration order is the hierarchy order of the partition layout
/// (`topic/year=/month=/day=/hour=/fileName`), so iterating a
/// [`PartitionMatch`] always visits coarser components first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    Topic,
    Year,
    Month,
    Day,
    Hour,
    FileName,
}

impl Component {
    /// Components a partition key may carry, in hierarchy order.
    pub const PARTITION: [Component; 5] = [
        Component::Topic,
        Component::Year,
        Component::Month,
        Component::Day,
        Component::Hour,
    ];

    /// Date components in hierarchy order.
    pub const DATE: [Component; 4] = [
        Component::Year,
        Component::Month,
        Component::Day,
        Component::Hour,
    ];

    /// Name of the regex capture group carrying this component.
    pub fn group_name(&self) -> &'static str {
        match self {
            Component::Topic => "topic",
            Component::Year => "year",
            Component::Month => "month",
            Component::Day => "day",
            Component::Hour => "hour",
            Component::FileName => "fileName",
        }
    }

    /// The component directly above this one in the date hierarchy.
    fn date_parent(&self) -> Option<Component> {
        match self {
            Component::Month => Some(Component::Year),
            Component::Day => Some(Component::Month),
            Component::Hour => Some(Component::Day),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}

/// Components present in a partition (directory) key.
///
/// Shallower keys expose fewer components: `topics/orders/` only carries a
/// topic, `topics/orders/year=2023/month=11/` carries topic, year and month.
///
/// # Example
///
/// ```
/// use kbx_types::{Component, PartitionMatch};
///
/// let m = PartitionMatch::new()
///     .with(Component::Topic, "orders")
///     .with(Component::Year, "2023");
///
/// assert_eq!(m.topic(), Some("orders"));
/// assert!(m.contains(Component::Year));
/// assert!(!m.contains(Component::Month));
/// assert!(m.is_hierarchical());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionMatch {
    components: BTreeMap<Component, String>,
}

impl PartitionMatch {
    /// Create an empty match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component and return the match.
    pub fn with(mut self, component: Component, value: impl Into<String>) -> Self {
        self.insert(component, value);
        self
    }

    /// Record a component value. Empty values are ignored.
    pub fn insert(&mut self, component: Component, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.components.insert(component, value);
        }
    }

    /// Get the value of a component, if present.
    pub fn get(&self, component: Component) -> Option<&str> {
        self.components.get(&component).map(String::as_str)
    }

    /// Check whether a component is present.
    pub fn contains(&self, component: Component) -> bool {
        self.components.contains_key(&component)
    }

    /// The topic component, if this key is at or below the topic level.
    pub fn topic(&self) -> Option<&str> {
        self.get(Component::Topic)
    }

    /// Present date components, coarsest first.
    pub fn date_components(&self) -> impl Iterator<Item = (Component, &str)> {
        self.components
            .iter()
            .filter(|(c, _)| Component::DATE.contains(*c))
            .map(|(c, v)| (*c, v.as_str()))
    }

    /// Whether every present date component has its parent present.
    ///
    /// A `month` without a `year` cannot be placed on the time axis.
    pub fn is_hierarchical(&self) -> bool {
        self.components
            .keys()
            .filter_map(|c| c.date_parent())
            .all(|parent| self.contains(parent))
    }

    /// Number of present components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if no component is present.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Components of a recognized data file key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafMatch {
    /// Topic the file was backed up from
    pub topic: String,

    /// File name (last key segment)
    pub file_name: String,

    /// Hour the file represents (minutes and seconds are zero)
    pub represented_time: NaiveDateTime,
}

impl LeafMatch {
    /// Build a leaf match from its raw captured values.
    ///
    /// Returns `None` when the date components do not form a valid hour.
    pub fn from_parts(
        topic: &str,
        file_name: &str,
        year: &str,
        month: &str,
        day: &str,
        hour: &str,
    ) -> Option<Self> {
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        let day: u32 = day.parse().ok()?;
        let hour: u32 = hour.parse().ok()?;

        let represented_time = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)?;

        Some(Self {
            topic: topic.to_string(),
            file_name: file_name.to_string(),
            represented_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_order_is_hierarchy_order() {
        assert!(Component::Topic < Component::Year);
        assert!(Component::Year < Component::Month);
        assert!(Component::Month < Component::Day);
        assert!(Component::Day < Component::Hour);
    }

    #[test]
    fn test_group_names() {
        assert_eq!(Component::FileName.group_name(), "fileName");
        assert_eq!(Component::Hour.to_string(), "hour");
    }

    #[test]
    fn test_empty_values_are_absent() {
        let m = PartitionMatch::new()
            .with(Component::Topic, "")
            .with(Component::Year, "2023");

        assert!(!m.contains(Component::Topic));
        assert_eq!(m.topic(), None);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_date_components_in_hierarchy_order() {
        let m = PartitionMatch::new()
            .with(Component::Hour, "15")
            .with(Component::Day, "03")
            .with(Component::Topic, "orders")
            .with(Component::Year, "2023")
            .with(Component::Month, "11");

        let order: Vec<Component> = m.date_components().map(|(c, _)| c).collect();
        assert_eq!(order, Component::DATE.to_vec());
    }

    #[test]
    fn test_hierarchy_violations() {
        let month_without_year = PartitionMatch::new()
            .with(Component::Topic, "orders")
            .with(Component::Month, "11");
        assert!(!month_without_year.is_hierarchical());

        let hour_without_day = PartitionMatch::new()
            .with(Component::Year, "2023")
            .with(Component::Month, "11")
            .with(Component::Hour, "10");
        assert!(!hour_without_day.is_hierarchical());

        let topic_only = PartitionMatch::new().with(Component::Topic, "orders");
        assert!(topic_only.is_hierarchical());
    }

    #[test]
    fn test_leaf_match_from_parts() {
        let leaf = LeafMatch::from_parts(
            "neptunedb-security",
            "neptunedb-security+1+0000000000.json.gz",
            "2023",
            "11",
            "03",
            "15",
        )
        .unwrap();

        assert_eq!(leaf.topic, "neptunedb-security");
        assert_eq!(
            leaf.represented_time,
            NaiveDate::from_ymd_opt(2023, 11, 3)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_leaf_match_invalid_date() {
        assert!(LeafMatch::from_parts("t", "f", "2023", "02", "30", "00").is_none());
        assert!(LeafMatch::from_parts("t", "f", "2023", "11", "03", "24").is_none());
        assert!(LeafMatch::from_parts("t", "f", "year", "11", "03", "10").is_none());
    }
}
