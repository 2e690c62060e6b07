//! Time window and topic pruning for partially specified partition keys.
//!
//! A partition key only pins down a prefix of its date: `year=2023` covers the
//! whole year, `year=2023/month=02` covers February 2023. Each present date
//! component narrows the widest interval consistent with the key, and the
//! branch is pruned as soon as that interval cannot overlap the window.
//! All intervals are half-open, matching [`TimeWindow`].

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use kbx_types::{Component, PartitionMatch, TimeWindow, TopicFilter};

/// Outcome of checking a partition against the request filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The branch may contain matching data
    Accept,
    /// The partition's topic is not in the allow-list
    TopicMismatch,
    /// The interval implied by this component does not overlap the window
    OutOfRange(Component),
    /// This component cannot be read as a date part
    Malformed(Component),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Decides which partitions and data files fall inside a request's filters.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use kbx_explorer::range::RangeFilter;
/// use kbx_types::{Component, PartitionMatch, TimeWindow, TopicFilter};
///
/// let from = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let until = NaiveDate::from_ymd_opt(2023, 11, 4).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let filter = RangeFilter::new(TimeWindow::new(from, until).unwrap(), TopicFilter::All);
///
/// let november = PartitionMatch::new()
///     .with(Component::Year, "2023")
///     .with(Component::Month, "11");
/// let december = PartitionMatch::new()
///     .with(Component::Year, "2023")
///     .with(Component::Month, "12");
///
/// assert!(filter.possibly_in_range(&november));
/// assert!(!filter.possibly_in_range(&december));
/// ```
#[derive(Debug, Clone)]
pub struct RangeFilter {
    window: TimeWindow,
    topics: TopicFilter,
}

impl RangeFilter {
    /// Create a filter for a window and topic allow-list.
    pub fn new(window: TimeWindow, topics: TopicFilter) -> Self {
        Self { window, topics }
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn topics(&self) -> &TopicFilter {
        &self.topics
    }

    /// Whether the branch below this partition can contain matching data.
    pub fn possibly_in_range(&self, partition: &PartitionMatch) -> bool {
        self.check_partition(partition).is_accept()
    }

    /// Check a partition, reporting why it was rejected.
    ///
    /// The topic is only checked when the key carries one; shallower keys
    /// defer the topic decision to the level that exposes it. Date components
    /// are evaluated coarsest first and evaluation stops at the first one
    /// whose interval misses the window.
    pub fn check_partition(&self, partition: &PartitionMatch) -> Verdict {
        if let Some(topic) = partition.topic() {
            if !self.topics.allows(topic) {
                return Verdict::TopicMismatch;
            }
        }

        let mut cursor = DateCursor::default();
        for (component, raw) in partition.date_components() {
            let Some((start, end)) = cursor.narrow(component, raw) else {
                return Verdict::Malformed(component);
            };
            if !self.window.overlaps(start, end) {
                return Verdict::OutOfRange(component);
            }
        }

        Verdict::Accept
    }

    /// Whether a data file's represented hour and topic pass the filters.
    ///
    /// A data file covers `[time, time + 1h)`, the same interval as its
    /// `hour=` partition, so a window starting mid-hour keeps that hour's files.
    pub fn in_range(&self, time: NaiveDateTime, topic: &str) -> bool {
        let end = time.checked_add_signed(Duration::hours(1));
        self.window.overlaps(time, end) && self.topics.allows(topic)
    }
}

/// Date parts seen so far while walking a partition's components.
#[derive(Debug, Default)]
struct DateCursor {
    year: Option<i32>,
    month: Option<u32>,
    date: Option<NaiveDate>,
}

impl DateCursor {
    /// Fold in one component and return the interval it implies.
    ///
    /// The end is `None` when the interval reaches past the representable range.
    fn narrow(
        &mut self,
        component: Component,
        raw: &str,
    ) -> Option<(NaiveDateTime, Option<NaiveDateTime>)> {
        match component {
            Component::Year => {
                let year: i32 = raw.parse().ok()?;
                self.year = Some(year);
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let end = year
                    .checked_add(1)
                    .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
                Some((midnight(start), end.map(midnight)))
            }
            Component::Month => {
                let month: u32 = raw.parse().ok()?;
                self.month = Some(month);
                let start = NaiveDate::from_ymd_opt(self.year?, month, 1)?;
                let end = start.checked_add_months(Months::new(1));
                Some((midnight(start), end.map(midnight)))
            }
            Component::Day => {
                let day: u32 = raw.parse().ok()?;
                let start = NaiveDate::from_ymd_opt(self.year?, self.month?, day)?;
                self.date = Some(start);
                Some((midnight(start), start.succ_opt().map(midnight)))
            }
            Component::Hour => {
                let hour: u32 = raw.parse().ok()?;
                let start = self.date?.and_hms_opt(hour, 0, 0)?;
                Some((start, start.checked_add_signed(Duration::hours(1))))
            }
            Component::Topic | Component::FileName => None,
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
