//! Date range error types.

/// A start/end pair that does not describe a valid inclusive day range.
///
/// Range queries treat this as "resolve zero files" rather than a fault.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid date range: {}..={} at line {} in {}", start, end, line, file)]
pub struct DateRangeError {
    /// Start date as supplied
    pub start: String,
    /// End date as supplied
    pub end: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl DateRangeError {
    /// Create a new DateRangeError for the supplied endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclelog_error::DateRangeError;
    ///
    /// let err = DateRangeError::new("2024-13-01", "2024-01-02");
    /// assert_eq!(err.start, "2024-13-01");
    /// ```
    #[track_caller]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            start: start.into(),
            end: end.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
