//! Query and report command handlers.

use super::commands::{AppendArgs, OutputFormat, RangeArgs};
use super::output::{emit, or_dash, rule, time};
use cyclelog::{
    CycleLog, CyclelogResult, DailyRollup, KpiReport, LogQuery, LogView, OperatorSession,
    RangeRequest, Status, format_hours_minutes,
};

impl From<RangeArgs> for RangeRequest {
    fn from(args: RangeArgs) -> Self {
        RangeRequest {
            start: args.start,
            end: args.end,
        }
    }
}

/// `cyclelog logs`
pub async fn handle_logs(
    query: &LogQuery,
    range: RangeArgs,
    format: OutputFormat,
) -> CyclelogResult<()> {
    let logs = query.logs(&range.into()).await?;
    emit(format, logs.as_slice(), print_logs)
}

fn print_logs(logs: &[LogView]) {
    println!(
        "{:<8} {:<6} {:<16} {:<16} {:<7} {:<14} {:<17} {:<17}",
        "machine", "log", "operator", "supervisor", "status", "confirmation", "start", "press"
    );
    rule();
    for log in logs {
        println!(
            "{:<8} {:<6} {:<16} {:<16} {:<7} {:<14} {:<17} {:<17}",
            or_dash(log.machine_id),
            or_dash(log.log_id),
            or_dash(log.operator.as_ref().map(|p| p.name.clone())),
            or_dash(log.supervisor.as_ref().map(|p| p.name.clone())),
            or_dash(log.status.as_ref()),
            or_dash(log.supervisor_confirmation.as_ref()),
            time(log.cycle_start_time),
            time(log.operator_press_time),
        );
    }
    rule();
    println!("Total: {} cycles", logs.len());
}

/// `cyclelog sessions`
pub async fn handle_sessions(
    query: &LogQuery,
    range: RangeArgs,
    format: OutputFormat,
) -> CyclelogResult<()> {
    let sessions = query.sessions(&range.into()).await?;
    emit(format, sessions.as_slice(), print_sessions)
}

fn print_sessions(sessions: &[OperatorSession]) {
    println!(
        "{:<8} {:<8} {:<9} {:<12} {:<17} {:<17} {:<8}",
        "session", "machine", "operator", "badge", "started", "ended", "length"
    );
    rule();
    for s in sessions {
        println!(
            "{:<8} {:<8} {:<9} {:<12} {:<17} {:<17} {:<8}",
            s.session_id,
            s.machine_id,
            s.operator_id,
            s.badge,
            time(Some(s.started_at)),
            time(Some(s.ended_at)),
            format_hours_minutes(s.duration()),
        );
    }
    rule();
    println!("Total: {} sessions", sessions.len());
}

/// `cyclelog append`
pub async fn handle_append(
    query: &LogQuery,
    args: AppendArgs,
    format: OutputFormat,
) -> CyclelogResult<()> {
    let log = CycleLog {
        machine_id: Some(args.machine),
        operator_id: args.operator,
        supervisor_id: args.supervisor,
        color: args.color,
        status: args.status.map(Status::from),
        operator_press_time: args.press,
        cycle_start_time: Some(args.start),
        cycle_end_time: args.end,
        ..Default::default()
    };

    let log_id = query.append(log).await?;
    emit(format, &serde_json::json!({ "id": log_id }), |_| {
        println!("Created log {} on machine {}", log_id, args.machine)
    })
}

/// `cyclelog kpi`
pub async fn handle_kpi(
    query: &LogQuery,
    range: RangeArgs,
    format: OutputFormat,
) -> CyclelogResult<()> {
    let report = query.kpi(&range.into()).await?;
    emit(format, &report, print_kpi)
}

fn print_kpi(report: &KpiReport) {
    let logs = report.logs();
    let sessions = report.sessions();

    println!("Active operators:      {}", sessions.active_operators());
    println!("Avg work hours:        {}", format_hours_minutes(sessions.avg_work_time()));
    println!("Machine utilization:   {:.1}%", sessions.utilization());
    rule();
    println!("Supervisor activity:   {:.1}%", logs.review_rate());
    println!("Operator credibility:  {}", logs.credibility());
    println!("Compliance (OK):       {:.1}%", logs.ok_rate());
    println!("Compliance (DELAY):    {:.1}%", logs.delay_rate());
    println!(
        "Avg supervisor response: {}",
        logs.avg_response()
            .map(|d| format!("{}m {}s", d.num_minutes(), d.num_seconds() % 60))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("Status: {} OK, {} DELAY of {} cycles", logs.ok(), logs.delay(), logs.total());
    rule();

    match report.top_operator() {
        Some(op) => println!("Top operator:   {} ({} cycles)", op.name(), op.total()),
        None => println!("Top operator:   -"),
    }
    match report.top_supervisor() {
        Some(sup) => println!("Top supervisor: {} ({} reviews)", sup.name(), sup.reviewed()),
        None => println!("Top supervisor: -"),
    }
    rule();

    println!(
        "{:<20} {:>6} {:>6} {:>6} {:>9} {:>9}",
        "operator", "total", "ok", "delay", "confirmed", "working"
    );
    for op in report.operators() {
        println!(
            "{:<20} {:>6} {:>6} {:>6} {:>9} {:>9}",
            op.name(),
            op.total(),
            op.ok(),
            op.delay(),
            op.confirmed(),
            format_hours_minutes(op.working_time()),
        );
    }
}

/// `cyclelog trend`
pub async fn handle_trend(
    query: &LogQuery,
    range: RangeArgs,
    format: OutputFormat,
) -> CyclelogResult<()> {
    let days = query.trend(&range.into()).await?;
    emit(format, days.as_slice(), print_trend)
}

fn print_trend(days: &[DailyRollup]) {
    println!(
        "{:<11} {:>7} {:>7} {:>7} {:>12} {:>11}",
        "day", "cycles", "ok%", "delay%", "credibility", "utilization"
    );
    rule();
    for day in days {
        println!(
            "{:<11} {:>7} {:>7.1} {:>7.1} {:>12} {:>10.1}%",
            day.day().to_string(),
            day.cycles(),
            day.logs().ok_rate(),
            day.logs().delay_rate(),
            day.logs().credibility().to_string(),
            day.sessions().utilization(),
        );
    }
}
