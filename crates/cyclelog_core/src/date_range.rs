//! Date-range resolution onto day-files.
//!
//! Logs are partitioned as `machine_<id>/<YYYY-MM-DD>.json`. A query window is
//! resolved to the exact list of day-files it covers so that a range read never
//! lists or scans the rest of the archive.

use chrono::{DateTime, Days, NaiveDate, Utc};
use cyclelog_error::DateRangeError;
use serde::{Deserialize, Serialize};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// One calendar day, and the day-file that holds its logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::From,
)]
pub struct DayFile(NaiveDate);

impl DayFile {
    /// The day this file covers.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `YYYY-MM-DD`
    pub fn name(&self) -> String {
        self.0.format(DAY_FORMAT).to_string()
    }

    /// `YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Day-file holding a log whose cycle started at `ts`.
    pub fn for_timestamp(ts: DateTime<Utc>) -> Self {
        Self(ts.date_naive())
    }

    /// Parse a `YYYY-MM-DD.json` file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".json")?;
        NaiveDate::parse_from_str(stem, DAY_FORMAT).ok().map(Self)
    }
}

impl std::fmt::Display for DayFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Inclusive range of calendar days, `start <= end`.
///
/// # Examples
///
/// ```
/// use cyclelog_core::DateRange;
///
/// let range = DateRange::parse("2024-02-27", "2024-03-01").unwrap();
/// let names: Vec<String> = range.days().map(|d| d.name()).collect();
/// assert_eq!(names, ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);
///
/// assert!(DateRange::parse("2024-03-01", "2024-02-27").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    #[track_caller]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::new(
                start.format(DAY_FORMAT).to_string(),
                end.format(DAY_FORMAT).to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError`] if either date is not a valid calendar date
    /// or the range is inverted.
    #[track_caller]
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        match (parse_day(start), parse_day(end)) {
            (Some(s), Some(e)) if s <= e => Ok(Self { start: s, end: e }),
            _ => Err(DateRangeError::new(start, end)),
        }
    }

    /// A range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// `today - days ..= today`, the bounded default window for recent activity.
    pub fn trailing(today: NaiveDate, days: u64) -> Self {
        let start = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Number of days covered, `end - start + 1`.
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = DayFile> + use<> {
        let end = self.end;
        self.start
            .iter_days()
            .take_while(move |d| *d <= end)
            .map(DayFile)
    }

    /// Whether `ts` falls on a day inside the range (UTC), from
    /// `start 00:00:00` through `end 23:59:59.999`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        day >= self.start && day <= self.end
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .ok()
        .or_else(|| crate::serde_helpers::parse_timestamp(raw).map(|ts| ts.date_naive()))
}

/// Resolve a start/end pair to the day-files it covers, ascending and inclusive.
///
/// # Errors
///
/// Returns [`DateRangeError`] for unparsable or inverted input. Range queries
/// treat that as "resolve zero files".
///
/// # Examples
///
/// ```
/// use cyclelog_core::resolve_files;
///
/// let files = resolve_files("2024-01-30", "2024-02-01").unwrap();
/// let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
/// assert_eq!(names, ["2024-01-30.json", "2024-01-31.json", "2024-02-01.json"]);
/// ```
#[track_caller]
pub fn resolve_files(start: &str, end: &str) -> Result<Vec<DayFile>, DateRangeError> {
    Ok(DateRange::parse(start, end)?.days().collect())
}
