//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the cyclelog binary.

mod commands;
mod maintenance;
mod metadata;
mod output;
mod reports;

pub use commands::{Cli, Commands, OutputFormat};
pub use maintenance::{handle_backfill, handle_generate_sessions, handle_migrate_filenames};
pub use metadata::handle_metadata_command;
pub use reports::{handle_append, handle_kpi, handle_logs, handle_sessions, handle_trend};
