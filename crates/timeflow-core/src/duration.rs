//! Activity durations and the duration table.
//!
//! [`ActivityDuration`] is the time quantity attached to an activity. It is
//! stored with nanosecond precision and printed in a canonical
//! `"{D} days {HH}:{MM}:{SS}[.fraction]"` form, the same form the upstream
//! graph builder writes into duration files.
//!
//! [`DurationTable`] maps activity names to durations. Activities missing from
//! the table are *durationless*; the layout engine decides how to place them.

use std::{collections::HashMap, fmt, time::Duration};

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// A non-negative typical duration for an activity.
///
/// # Examples
///
/// ```
/// # use timeflow_core::duration::ActivityDuration;
/// let duration = ActivityDuration::from_secs(90_061);
/// assert_eq!(duration.to_string(), "1 days 01:01:01");
///
/// let short = ActivityDuration::from_nanos(1_500_000_000);
/// assert_eq!(short.to_string(), "0 days 00:00:01.5");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityDuration(Duration);

impl ActivityDuration {
    /// The zero duration.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a duration from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Creates a duration from nanoseconds.
    pub fn from_nanos(nanos: u64) -> Self {
        Self(Duration::from_nanos(nanos))
    }

    /// Creates a duration from a total nanosecond count, failing on overflow
    /// of the representable range.
    pub fn try_from_total_nanos(nanos: u128) -> Option<Self> {
        let secs = u64::try_from(nanos / u128::from(NANOS_PER_SECOND)).ok()?;
        let subsec = (nanos % u128::from(NANOS_PER_SECOND)) as u32;
        Some(Self(Duration::new(secs, subsec)))
    }

    /// Returns the total number of nanoseconds.
    pub fn as_nanos(&self) -> u128 {
        self.0.as_nanos()
    }

    /// Returns the duration as fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns true for the zero duration.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for ActivityDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<ActivityDuration> for Duration {
    fn from(duration: ActivityDuration) -> Self {
        duration.0
    }
}

impl fmt::Display for ActivityDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.as_secs();
        let days = total / SECONDS_PER_DAY;
        let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
        let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
        let seconds = total % SECONDS_PER_MINUTE;

        write!(f, "{days} days {hours:02}:{minutes:02}:{seconds:02}")?;

        let nanos = self.0.subsec_nanos();
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// Mapping from activity name to its typical duration.
///
/// Built once from a duration file and immutable afterwards. Inserting a
/// name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationTable {
    entries: HashMap<String, ActivityDuration>,
}

impl DurationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the duration for `name`, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        duration: ActivityDuration,
    ) -> Option<ActivityDuration> {
        self.entries.insert(name.into(), duration)
    }

    /// Looks up the duration of an activity.
    pub fn get(&self, name: &str) -> Option<ActivityDuration> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ActivityDuration)> {
        self.entries
            .iter()
            .map(|(name, duration)| (name.as_str(), *duration))
    }
}

impl<S: Into<String>> FromIterator<(S, ActivityDuration)> for DurationTable {
    fn from_iter<T: IntoIterator<Item = (S, ActivityDuration)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (name, duration) in iter {
            table.insert(name, duration);
        }
        table
    }
}
