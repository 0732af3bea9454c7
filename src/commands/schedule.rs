use anyhow::Result;
use chrono::NaiveDate;
use std::fmt::Write as _;

use turnero::models::ScheduleEntry;
use turnero::scheduler::HoursSummary;

use super::{print_json, App, RangeArgs};

pub fn schedule(app: &App, range: &RangeArgs, json: bool) -> Result<()> {
    let (from, to) = range.resolve_today()?;
    let service = app.service()?;
    let entries = service.effective_schedule(from, to);

    tracing::debug!(from = %from, to = %to, entries = entries.len(), "Rendering schedule");

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        let (first, last) = service.range();
        println!("No schedule between {from} and {to} (generated range: {first} to {last})");
        return Ok(());
    }

    print!("{}", render_schedule(&entries));
    Ok(())
}

pub fn free(app: &App, date: NaiveDate) -> Result<()> {
    let service = app.service()?;
    let free = service.free_worker(date)?;
    let baseline = service.baseline_free(date)?;

    if free == baseline {
        println!("{date}: {free} is free");
    } else {
        println!("{date}: {free} is free (rotation: {baseline})");
    }
    Ok(())
}

pub fn hours(app: &App, range: &RangeArgs, json: bool) -> Result<()> {
    let (from, to) = range.resolve_today()?;
    let summary = app.service()?.hours_worked(from, to);

    if json {
        return print_json(&summary);
    }

    println!("Scheduled hours {from} to {to}");
    print!("{}", render_hours(&summary));
    Ok(())
}

/// One block per day: free worker, then each shift with hours and seats
fn render_schedule(entries: &[ScheduleEntry]) -> String {
    let mut out = String::new();

    for day in entries.chunk_by(|a, b| a.date == b.date) {
        let first = &day[0];
        let _ = writeln!(
            out,
            "{} {}  free: {}",
            first.date.format("%a"),
            first.date,
            first.free
        );
        for entry in day {
            let _ = writeln!(
                out,
                "  {:<9} {:<19} {} / {}",
                entry.shift.spanish_label(),
                entry.slot().hours_label(),
                entry.occupant_a,
                entry.occupant_b
            );
        }
    }
    out
}

fn render_hours(summary: &[HoursSummary]) -> String {
    let mut out = String::new();
    for row in summary {
        let _ = writeln!(
            out,
            "  {:<8} {:>3} shifts {:>4} h",
            row.worker.name(),
            row.shifts,
            row.hours
        );
    }
    out
}
