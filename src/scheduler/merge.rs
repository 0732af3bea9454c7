//! Layering persisted overrides on top of a generated baseline

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Occupant, ScheduleEntry, ShiftKind, Worker};

/// Manually changed seats of one (date, shift)
///
/// Only fields the operator touched are `Some`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftOverride {
    pub occupant_a: Option<Occupant>,
    pub occupant_b: Option<Occupant>,
}

impl ShiftOverride {
    pub fn is_empty(&self) -> bool {
        self.occupant_a.is_none() && self.occupant_b.is_none()
    }
}

/// Every persisted override, keyed the way the merge consumes them
///
/// The free designation is per day, so it is kept apart from the per-shift seat
/// patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub shifts: HashMap<(NaiveDate, ShiftKind), ShiftOverride>,
    pub free: HashMap<NaiveDate, Worker>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.values().all(ShiftOverride::is_empty) && self.free.is_empty()
    }

    pub fn shift(&self, date: NaiveDate, shift: ShiftKind) -> Option<&ShiftOverride> {
        self.shifts.get(&(date, shift))
    }

    pub fn free(&self, date: NaiveDate) -> Option<Worker> {
        self.free.get(&date).copied()
    }

    pub fn set_shift(&mut self, date: NaiveDate, shift: ShiftKind, patch: ShiftOverride) {
        self.shifts.insert((date, shift), patch);
    }

    pub fn set_free(&mut self, date: NaiveDate, worker: Worker) {
        self.free.insert(date, worker);
    }
}

/// Left-join `baseline` against `overrides`
///
/// Present override fields win, absent ones fall through. The output has exactly
/// one entry per baseline entry, in the same order; overrides for dates outside
/// the baseline are ignored.
pub fn merge(baseline: &[ScheduleEntry], overrides: &Overrides) -> Vec<ScheduleEntry> {
    if overrides.is_empty() {
        return baseline.to_vec();
    }

    baseline
        .iter()
        .map(|entry| {
            let mut merged = entry.clone();
            if let Some(patch) = overrides.shift(entry.date, entry.shift) {
                if let Some(a) = patch.occupant_a {
                    merged.occupant_a = a;
                }
                if let Some(b) = patch.occupant_b {
                    merged.occupant_b = b;
                }
            }
            if let Some(free) = overrides.free(entry.date) {
                merged.free = free;
            }
            merged
        })
        .collect()
}
