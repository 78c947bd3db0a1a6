//! Error types for the Cyclelog library.
//!
//! This crate provides the foundation error types used throughout the Cyclelog workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use cyclelog_error::{CyclelogResult, ValidationError, ValidationErrorKind};
//!
//! fn create_log() -> CyclelogResult<u64> {
//!     Err(ValidationError::new(ValidationErrorKind::MissingRequiredField(
//!         "machine_id".to_string(),
//!     )))?
//! }
//!
//! match create_log() {
//!     Ok(id) => println!("Created log {}", id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod date_range;
mod error;
mod json;
mod storage;
mod validation;

pub use config::ConfigError;
pub use date_range::DateRangeError;
pub use error::{CyclelogError, CyclelogErrorKind, CyclelogResult};
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
