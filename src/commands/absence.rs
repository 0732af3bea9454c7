use anyhow::Result;
use chrono::NaiveDate;

use turnero::models::{Occupant, Seat, ShiftKind};
use turnero::scheduler::CommitReport;

use super::{print_json, App, RangeArgs};

/// Stage the absence, then save the day as shown
pub fn absent(app: &App, date: NaiveDate, shift: ShiftKind, seat: Seat) -> Result<()> {
    let mut service = app.service()?;

    let plan = service.stage_absence(date, shift, seat)?;
    let choices = service.day_choices(date)?;
    let report = service.commit_day(date, choices)?;

    match plan.absent {
        Some(worker) => println!("{date} {shift} seat {seat}: {worker} absent, covered by {}", plan.cover),
        None => println!("{date} {shift} seat {seat}: now {}", plan.cover),
    }
    print_report(&report);
    Ok(())
}

/// Select an occupant for one seat and save the day
pub fn assign(
    app: &App,
    date: NaiveDate,
    shift: ShiftKind,
    seat: Seat,
    occupant: Occupant,
) -> Result<()> {
    let mut service = app.service()?;

    service.select_seat(date, shift, seat, occupant)?;
    let choices = service.day_choices(date)?;
    let report = service.commit_day(date, choices)?;

    println!("{date} {shift} seat {seat}: {occupant}");
    print_report(&report);
    Ok(())
}

pub fn absences(app: &App, range: &RangeArgs, json: bool) -> Result<()> {
    let (from, to) = range.resolve_today()?;
    let records = app.service()?.absences_between(from, to)?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No absences between {from} and {to}");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {:<9} {}  {:<8} {}  (logged {})",
            record.date,
            record.shift.spanish_label(),
            record.seat,
            record.worker.name(),
            record.reason,
            record.logged_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn print_report(report: &CommitReport) {
    println!("Saved {}; free: {}", report.date, report.free);
    if report.retracted > 0 {
        println!("Retracted {} absence(s) of workers now seated", report.retracted);
    }
}
