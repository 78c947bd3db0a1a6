//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create a data directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to list a data directory
    #[display("Failed to read directory: {}", _0)]
    DirectoryRead(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// File contents are not the expected JSON shape
    #[display("Failed to parse file: {}", _0)]
    Parse(String),
    /// File or record not found at the specified location
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Failed to rename a file
    #[display("Failed to rename file: {}", _0)]
    Rename(String),
    /// No `log_id` left to assign in a day-file
    #[display("Log ids exhausted: {}", _0)]
    IdsExhausted(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use cyclelog_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("machine_3/2024-01-01.json".to_string()));
/// assert!(format!("{}", err).contains("Not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}
