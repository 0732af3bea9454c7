//! Scheduled hours per worker

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ScheduleEntry, Worker};

/// Scheduled shifts and hours of one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoursSummary {
    pub worker: Worker,
    pub shifts: u32,
    pub hours: u32,
}

/// Count seated shifts per worker
///
/// Every seat a worker holds counts one full shift. Uncovered seats are
/// skipped. Sorted by hours descending, then by name.
pub fn summarize(entries: &[ScheduleEntry]) -> Vec<HoursSummary> {
    let mut totals: BTreeMap<Worker, HoursSummary> = BTreeMap::new();

    for entry in entries {
        let hours = entry.slot().hours();
        for worker in entry.seats().workers() {
            let total = totals.entry(worker).or_insert(HoursSummary {
                worker,
                shifts: 0,
                hours: 0,
            });
            total.shifts += 1;
            total.hours += hours;
        }
    }

    let mut summary: Vec<HoursSummary> = totals.into_values().collect();
    summary.sort_by(|a, b| {
        b.hours
            .cmp(&a.hours)
            .then_with(|| a.worker.name().cmp(b.worker.name()))
    });
    summary
}
