//! Rendering helpers shared by the command handlers.

use super::commands::OutputFormat;
use chrono::{DateTime, Utc};
use cyclelog::CyclelogResult;
use serde::Serialize;

/// Print `value` as pretty JSON, or run `human` for the human format.
pub fn emit<T, F>(format: OutputFormat, value: &T, human: F) -> CyclelogResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| cyclelog::JsonError::new(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => human(value),
    }
    Ok(())
}

/// `YYYY-MM-DD HH:MM`, or `-`.
pub fn time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Display value or `-`.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Horizontal rule.
pub fn rule() {
    println!("{:-<80}", "");
}
