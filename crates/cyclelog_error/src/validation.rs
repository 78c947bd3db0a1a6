//! Input validation errors.

/// Specific validation failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A field the operation cannot proceed without is absent
    #[display("Missing required field: {}", _0)]
    MissingRequiredField(String),

    /// A record with the same id already exists
    #[display("{} id already exists: {}", table, id)]
    DuplicateId {
        /// Table name
        table: String,
        /// Offending id
        id: i64,
    },

    /// No record with the given id exists
    #[display("{} not found: {}", table, id)]
    NotFound {
        /// Table name
        table: String,
        /// Requested id
        id: i64,
    },
}

/// Validation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    line: u32,
    file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing required field.
    #[track_caller]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingRequiredField(field.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}
