//! CLI command definitions.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cyclelog - needle-change cycle logs, sessions and KPIs
#[derive(Parser, Debug)]
#[command(name = "cyclelog")]
#[command(about = "Needle-change cycle logs, operator sessions and KPI reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Load configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured data root
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List joined cycle logs for a date window, most recent first
    Logs(RangeArgs),

    /// List operator sessions, optionally limited to a date window
    Sessions(RangeArgs),

    /// Record a new cycle log
    Append(AppendArgs),

    /// KPI report for a date window
    Kpi(RangeArgs),

    /// Per-day metrics for a date window
    Trend(RangeArgs),

    /// Rebuild machine_sessions.json from every day-file
    GenerateSessions,

    /// Rename legacy DDMMYYYY.json day-files to YYYY-MM-DD.json
    MigrateFilenames,

    /// Normalise supervisor fields on every stored log
    BackfillSupervisors,

    /// Manage machines, operators and supervisors
    #[command(subcommand)]
    Metadata(MetadataCommands),
}

/// Date window; omitted dates fall back to the configured recent window.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start: Option<String>,

    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub end: Option<String>,
}

/// Fields of a new cycle log
#[derive(Args, Debug, Clone)]
pub struct AppendArgs {
    /// Machine id
    #[arg(long)]
    pub machine: i64,

    /// Cycle start (RFC 3339); selects the day-file
    #[arg(long, value_parser = parse_time)]
    pub start: DateTime<Utc>,

    /// Cycle end (RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub end: Option<DateTime<Utc>>,

    /// Operator id
    #[arg(long)]
    pub operator: Option<i64>,

    /// Supervisor id
    #[arg(long)]
    pub supervisor: Option<i64>,

    /// Needle/thread color
    #[arg(long)]
    pub color: Option<String>,

    /// Outcome (OK, DELAY)
    #[arg(long)]
    pub status: Option<String>,

    /// When the operator signalled completion (RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub press: Option<DateTime<Utc>>,
}

/// Metadata subcommands
#[derive(Subcommand, Debug)]
pub enum MetadataCommands {
    /// List one table
    List {
        /// Table to list
        table: Table,
    },

    /// Add a machine
    AddMachine {
        /// Machine id
        id: i64,
        /// Machine code
        code: String,
    },

    /// Add an operator
    AddOperator {
        /// Operator id
        id: i64,
        /// Display name
        name: String,
        /// Badge number
        #[arg(long)]
        badge: Option<String>,
    },

    /// Add a supervisor
    AddSupervisor {
        /// Supervisor id
        id: i64,
        /// Display name
        name: String,
        /// Badge number
        #[arg(long)]
        badge: Option<String>,
    },

    /// Delete a row by id
    Delete {
        /// Table to delete from
        table: Table,
        /// Row id
        id: i64,
    },
}

/// Metadata tables
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// machines.json
    Machines,
    /// operators.json
    Operators,
    /// supervisors.json
    Supervisors,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    cyclelog::serde_helpers::parse_timestamp(raw)
        .ok_or_else(|| format!("not a timestamp: {}", raw))
}
