//! Clock-in / clock-out log and hour totals
//!
//! Events are paired per worker in timestamp order: each clock-in is closed by
//! the next clock-out. Anything left unpaired is counted but never summed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::{ShiftKind, Worker};

/// Kind of time log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockKind {
    /// "Ingreso"
    ClockIn,
    /// "Salida"
    ClockOut,
}

impl ClockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClockIn => "in",
            Self::ClockOut => "out",
        }
    }
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "ingreso" => Ok(Self::ClockIn),
            "out" | "salida" => Ok(Self::ClockOut),
            other => Err(format!("unknown clock event type: {other}")),
        }
    }
}

/// One entry of the time log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    /// Row id, `None` until persisted
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub worker: Worker,
    pub kind: ClockKind,
    pub timestamp: NaiveDateTime,
    pub shift: Option<ShiftKind>,
    /// Where the event came from (e.g. `cli`)
    pub source: String,
}

impl ClockEvent {
    pub fn new(worker: Worker, kind: ClockKind, timestamp: NaiveDateTime) -> Self {
        Self {
            id: None,
            date: timestamp.date(),
            worker,
            kind,
            timestamp,
            shift: None,
            source: String::from("cli"),
        }
    }

    pub fn with_shift(mut self, shift: Option<ShiftKind>) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Clocked time of one worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockSummary {
    pub worker: Worker,
    pub hours: f64,
    /// Completed in/out pairs
    pub sessions: usize,
    /// Events that could not be paired
    pub unmatched: usize,
}

/// Sum clocked hours per worker
///
/// Output is sorted by hours descending, then by worker.
pub fn summarize(events: &[ClockEvent]) -> Vec<ClockSummary> {
    let mut by_worker: BTreeMap<Worker, Vec<&ClockEvent>> = BTreeMap::new();
    for event in events {
        by_worker.entry(event.worker).or_default().push(event);
    }

    let mut summaries: Vec<ClockSummary> = by_worker
        .into_iter()
        .map(|(worker, mut events)| {
            events.sort_by_key(|e| e.timestamp);

            let mut open: Option<NaiveDateTime> = None;
            let mut seconds = 0i64;
            let mut sessions = 0;
            let mut unmatched = 0;

            for event in events {
                match (event.kind, open) {
                    (ClockKind::ClockIn, Some(_)) => {
                        unmatched += 1;
                        open = Some(event.timestamp);
                    }
                    (ClockKind::ClockIn, None) => open = Some(event.timestamp),
                    (ClockKind::ClockOut, Some(start)) => {
                        seconds += (event.timestamp - start).num_seconds();
                        sessions += 1;
                        open = None;
                    }
                    (ClockKind::ClockOut, None) => unmatched += 1,
                }
            }
            if open.is_some() {
                unmatched += 1;
            }

            ClockSummary {
                worker,
                hours: seconds as f64 / 3600.0,
                sessions,
                unmatched,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.worker.cmp(&b.worker))
    });
    summaries
}
