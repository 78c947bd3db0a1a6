//! Cyclelog CLI binary.
//!
//! This binary provides command-line access to Cyclelog's functionality:
//! - Query joined cycle logs and operator sessions by date window
//! - Record new cycle logs
//! - Print KPI reports and per-day trends
//! - Run the session generator and archive maintenance batches
//! - Manage the machine, operator and supervisor tables

use clap::Parser;
use cyclelog::{CyclelogConfig, LogQuery, SystemClock};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, handle_append, handle_backfill, handle_generate_sessions, handle_kpi,
        handle_logs, handle_metadata_command, handle_migrate_filenames, handle_sessions,
        handle_trend,
    };

    // Load .env if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => CyclelogConfig::from_file(path)?,
        None => CyclelogConfig::load()?,
    };
    if let Some(root) = &cli.data_root {
        config = config.with_data_root(root);
    }

    let query = LogQuery::open(config, Arc::new(SystemClock))?;
    let format = cli.format;

    // Execute the requested command
    match cli.command {
        Commands::Logs(range) => handle_logs(&query, range, format).await?,
        Commands::Sessions(range) => handle_sessions(&query, range, format).await?,
        Commands::Append(args) => handle_append(&query, args, format).await?,
        Commands::Kpi(range) => handle_kpi(&query, range, format).await?,
        Commands::Trend(range) => handle_trend(&query, range, format).await?,
        Commands::GenerateSessions => handle_generate_sessions(&query, format).await?,
        Commands::MigrateFilenames => handle_migrate_filenames(&query, format).await?,
        Commands::BackfillSupervisors => handle_backfill(&query, format).await?,
        Commands::Metadata(cmd) => handle_metadata_command(&query, cmd, format).await?,
    }

    Ok(())
}
