//! Configuration error types.

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclelog_error::ConfigError;
    ///
    /// let err = ConfigError::new("Failed to parse configuration: missing field `data_root`");
    /// assert!(err.message.contains("data_root"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// A setting whose value is out of range.
    ///
    /// `key` is the dotted setting name as written in `cyclelog.toml`
    /// (`utilization.shift_hours`), or the `CYCLELOG_` variable carrying it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclelog_error::ConfigError;
    ///
    /// let err = ConfigError::invalid("utilization.machine_count", "must be positive");
    /// assert_eq!(err.message, "utilization.machine_count must be positive");
    /// ```
    #[track_caller]
    pub fn invalid(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(format!("{} {}", key, reason))
    }
}
