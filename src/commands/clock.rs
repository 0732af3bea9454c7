use anyhow::Result;
use chrono::NaiveDateTime;

use turnero::models::{ShiftKind, Worker};
use turnero::storage::TimeLogRepository;
use turnero::timesheet::{summarize, ClockEvent, ClockKind};
use turnero::utils::local_now;

use super::{print_json, App, RangeArgs};

pub fn clock_in(
    app: &App,
    worker: Worker,
    at: Option<NaiveDateTime>,
    shift: Option<ShiftKind>,
) -> Result<()> {
    record(app, worker, ClockKind::ClockIn, at, shift)
}

pub fn clock_out(
    app: &App,
    worker: Worker,
    at: Option<NaiveDateTime>,
    shift: Option<ShiftKind>,
) -> Result<()> {
    record(app, worker, ClockKind::ClockOut, at, shift)
}

fn record(
    app: &App,
    worker: Worker,
    kind: ClockKind,
    at: Option<NaiveDateTime>,
    shift: Option<ShiftKind>,
) -> Result<()> {
    let timestamp = at.unwrap_or_else(local_now);
    let event = ClockEvent::new(worker, kind, timestamp).with_shift(shift);
    let id = app.db.time_log().record(&event)?;

    println!("#{id} {worker} clock-{kind} at {}", timestamp.format("%Y-%m-%d %H:%M"));
    Ok(())
}

pub fn clock_summary(app: &App, range: &RangeArgs, json: bool) -> Result<()> {
    let (from, to) = range.resolve_today()?;
    let events = app.db.time_log().list_range(from, to)?;
    let summary = summarize(&events);

    if json {
        return print_json(&summary);
    }

    if summary.is_empty() {
        println!("No clock events between {from} and {to}");
        return Ok(());
    }

    println!("Clocked hours {from} to {to}");
    for row in &summary {
        let unmatched = if row.unmatched > 0 {
            format!("  ({} unpaired)", row.unmatched)
        } else {
            String::new()
        };
        println!(
            "  {:<8} {:>7.2} h  {:>3} sessions{unmatched}",
            row.worker.name(),
            row.hours,
            row.sessions
        );
    }
    Ok(())
}
