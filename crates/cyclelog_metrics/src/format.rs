//! Duration rendering.

use chrono::Duration;

/// Render as `"<h>h <m>m"`, truncating seconds. Negative input renders as `"0h 0m"`.
///
/// ```
/// use chrono::Duration;
/// use cyclelog_metrics::format_hours_minutes;
///
/// assert_eq!(format_hours_minutes(Duration::minutes(135)), "2h 15m");
/// assert_eq!(format_hours_minutes(Duration::seconds(59)), "0h 0m");
/// ```
pub fn format_hours_minutes(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}
