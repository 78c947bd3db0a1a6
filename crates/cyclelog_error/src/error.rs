//! Top-level error wrapper types.

use crate::{ConfigError, DateRangeError, JsonError, StorageError, ValidationError};

/// Every error condition the Cyclelog crates can surface.
///
/// # Examples
///
/// ```
/// use cyclelog_error::{CyclelogError, ConfigError};
///
/// let err: CyclelogError = ConfigError::invalid("utilization.machine_count", "must be positive").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CyclelogErrorKind {
    /// Unparsable or inverted date range
    #[from(DateRangeError)]
    DateRange(DateRangeError),
    /// Rejected input (missing fields, duplicate ids)
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Filesystem storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Cyclelog error with kind discrimination.
///
/// # Examples
///
/// ```
/// use cyclelog_error::{CyclelogErrorKind, CyclelogResult, DateRangeError};
///
/// fn might_fail() -> CyclelogResult<()> {
///     Err(DateRangeError::new("not-a-date", "2024-01-01"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), CyclelogErrorKind::DateRange(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cyclelog Error: {}", _0)]
pub struct CyclelogError(Box<CyclelogErrorKind>);

impl CyclelogError {
    /// Create a new error from a kind.
    pub fn new(kind: CyclelogErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CyclelogErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CyclelogErrorKind
impl<T> From<T> for CyclelogError
where
    T: Into<CyclelogErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Cyclelog operations.
pub type CyclelogResult<T> = std::result::Result<T, CyclelogError>;
