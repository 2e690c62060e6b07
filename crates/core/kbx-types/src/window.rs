//! Request filters: the time window and the topic allow-list.

use chrono::{NaiveDate, NaiveDateTime};
use kbx_error::{KbxError, Result};
use std::fmt;

/// Topic values that select every topic when given alone.
pub const TOPIC_ALL: [&str; 2] = ["*", "ALL"];

/// A half-open time window `[from, until)`.
///
/// Unbounded sides default to [`NaiveDateTime::MIN`] / [`NaiveDateTime::MAX`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use kbx_types::TimeWindow;
///
/// let from = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let until = NaiveDate::from_ymd_opt(2023, 11, 4).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let window = TimeWindow::new(from, until).unwrap();
///
/// assert!(window.contains(from));
/// assert!(!window.contains(until));
/// assert!(TimeWindow::new(until, from).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: NaiveDateTime,
    until: NaiveDateTime,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TimeWindow {
    /// Create a window, rejecting `from >= until`.
    pub fn new(from: NaiveDateTime, until: NaiveDateTime) -> Result<Self> {
        if from >= until {
            return Err(KbxError::InvalidRequest(format!(
                "from ({from}) must be before until ({until})"
            )));
        }
        Ok(Self { from, until })
    }

    /// Create a window from optional bounds.
    pub fn from_bounds(from: Option<NaiveDateTime>, until: Option<NaiveDateTime>) -> Result<Self> {
        Self::new(
            from.unwrap_or(NaiveDateTime::MIN),
            until.unwrap_or(NaiveDateTime::MAX),
        )
    }

    /// A window covering all representable time.
    pub fn unbounded() -> Self {
        Self {
            from: NaiveDateTime::MIN,
            until: NaiveDateTime::MAX,
        }
    }

    /// Inclusive lower bound.
    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    /// Exclusive upper bound.
    pub fn until(&self) -> NaiveDateTime {
        self.until
    }

    /// Check if a point in time falls inside the window.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.from <= time && time < self.until
    }

    /// Check if the half-open interval `[start, end)` overlaps the window.
    ///
    /// `end = None` means the interval is unbounded above.
    pub fn overlaps(&self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> bool {
        start < self.until && end.map_or(true, |end| self.from < end)
    }

    /// Whether either side of the window is bounded.
    pub fn is_bounded(&self) -> bool {
        self.from != NaiveDateTime::MIN || self.until != NaiveDateTime::MAX
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.until)
    }
}

/// The set of topics a request is interested in.
///
/// Topic comparison is case-insensitive.
///
/// # Example
///
/// ```
/// use kbx_types::TopicFilter;
///
/// assert_eq!(TopicFilter::parse("*").unwrap(), TopicFilter::All);
///
/// let filter = TopicFilter::parse("orders,Payments").unwrap();
/// assert!(filter.allows("PAYMENTS"));
/// assert!(!filter.allows("audit"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TopicFilter {
    /// No topic restriction
    #[default]
    All,
    /// Only these topics (stored lowercased)
    Topics(Vec<String>),
}

impl TopicFilter {
    /// Parse a comma-separated topic list.
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_list(input.split(','))
    }

    /// Build a filter from individual topic names.
    ///
    /// Blank names are dropped. A single `*` or `ALL` selects every topic;
    /// an empty list is rejected.
    pub fn from_list<I, S>(topics: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let topics: Vec<String> = topics
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        match topics.as_slice() {
            [] => Err(KbxError::InvalidRequest(
                "topic list must not be empty".to_string(),
            )),
            [single] if TOPIC_ALL.iter().any(|all| all.eq_ignore_ascii_case(single)) => {
                Ok(TopicFilter::All)
            }
            _ => Ok(TopicFilter::Topics(
                topics.iter().map(|t| t.to_lowercase()).collect(),
            )),
        }
    }

    /// Check if a topic passes the filter.
    pub fn allows(&self, topic: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Topics(topics) => {
                let topic = topic.to_lowercase();
                topics.iter().any(|t| *t == topic)
            }
        }
    }

    /// Whether this is the "all topics" sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, TopicFilter::All)
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicFilter::All => f.write_str("*"),
            TopicFilter::Topics(topics) => f.write_str(&topics.join(",")),
        }
    }
}

/// Accepted date-time layouts, tried in order.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO-8601 local date-time (`2023-11-03T14:00:15`,
/// `2023-11-03T14:00`) or date (`2023-11-03`, meaning midnight).
pub fn parse_date_time(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            KbxError::InvalidRequest(format!(
                "Invalid date '{raw}', expected e.g. 2023-11-03T14:00:15, 2023-11-03T14:00 or 2023-11-03"
            ))
        })
}
