//! Batch maintenance command handlers.

use super::commands::OutputFormat;
use super::output::emit;
use cyclelog::{CyclelogResult, LogQuery, MaintenanceReport};

/// `cyclelog generate-sessions`
pub async fn handle_generate_sessions(query: &LogQuery, format: OutputFormat) -> CyclelogResult<()> {
    let report = query.generate_sessions().await?;
    emit(format, &report, |r| {
        println!(
            "Wrote {} sessions from {} day-files ({} skipped)",
            r.sessions_written(),
            r.files_scanned(),
            r.files_skipped()
        );
        println!("Output: {}", query.layout().sessions_file().display());
    })
}

/// `cyclelog migrate-filenames`
pub async fn handle_migrate_filenames(query: &LogQuery, format: OutputFormat) -> CyclelogResult<()> {
    let report = query.migrate_filenames().await?;
    emit(format, &report, |r| print_report("Renamed", r))
}

/// `cyclelog backfill-supervisors`
pub async fn handle_backfill(query: &LogQuery, format: OutputFormat) -> CyclelogResult<()> {
    let report = query.backfill_supervisors().await?;
    emit(format, &report, |r| print_report("Rewrote", r))
}

fn print_report(verb: &str, report: &MaintenanceReport) {
    println!(
        "{} {} of {} files ({} skipped)",
        verb,
        report.files_changed(),
        report.files_scanned(),
        report.files_skipped()
    );
}
