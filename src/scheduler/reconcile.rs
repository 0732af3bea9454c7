//! Absence staging and day commit reconciliation
//!
//! Marking a seat absent pulls the day's free worker into the seat and makes
//! the absent worker the new free person. Those effects are staged in a
//! [`Session`] and only reach storage at the start of the next cycle
//! (see [`super::ScheduleService::apply_pending`]). Committing a day persists the
//! operator's seat choices and retracts absences of anyone who ended up present.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::rotation::ROTATION_ORDER;
use crate::models::{AbsenceRecord, DayChoices, Occupant, Seat, ShiftKind, Worker};

/// Address of one seat on one day
pub type SeatKey = (NaiveDate, ShiftKind, Seat);

/// Lifecycle of a seat within an editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    /// As generated or last committed
    Scheduled,
    /// Flagged absent, not yet committed
    MarkedAbsent,
    /// Absence committed with the day
    Reconciled,
}

/// What staging an absence decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsencePlan {
    /// Worker who was in the seat
    pub absent: Option<Worker>,
    /// New occupant of the vacated seat
    pub cover: Occupant,
    /// New free designation for the day, if it changes
    pub new_free: Option<Worker>,
}

/// Decide how an absence in `seat` of `shift` is covered
///
/// `choices` is the day as currently displayed, `free` the day's effective free
/// worker and `absent_today` everyone already logged absent that day. The free
/// worker covers unless they already sit elsewhere or are absent themselves.
pub fn plan_absence(
    choices: &DayChoices,
    free: Worker,
    shift: ShiftKind,
    seat: Seat,
    absent_today: &BTreeSet<Worker>,
) -> AbsencePlan {
    let absent = choices.get(shift).get(seat).worker();

    let mut vacated = *choices;
    vacated.set_seat(shift, seat, Occupant::NeedsCoverage);

    let unavailable = Some(free) == absent
        || vacated.present_workers().contains(&free)
        || absent_today.contains(&free);

    let cover = if unavailable {
        Occupant::NeedsCoverage
    } else {
        Occupant::Assigned(free)
    };

    AbsencePlan {
        absent,
        cover,
        new_free: absent,
    }
}

/// Pick the free worker to persist for a committed day
///
/// Keeps `current` when they are unseated or still out of a seat they were
/// flagged absent from (`held_out`). Otherwise the absence was retracted, and
/// the choice falls back to the generated free worker, then to the first
/// unseated worker in rotation order.
pub fn resolve_free(
    choices: &DayChoices,
    current: Worker,
    baseline: Worker,
    held_out: &BTreeSet<Worker>,
) -> Worker {
    let present = choices.present_workers();
    if !present.contains(&current) || held_out.contains(&current) {
        return current;
    }
    if !present.contains(&baseline) {
        return baseline;
    }
    ROTATION_ORDER
        .iter()
        .copied()
        .find(|w| !present.contains(w))
        .unwrap_or(current)
}

// ============================================================================
// Session
// ============================================================================

/// Changes staged during one cycle, applied and cleared at the next one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub free: BTreeMap<NaiveDate, Worker>,
    pub absences: Vec<AbsenceRecord>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.free.is_empty() && self.absences.is_empty()
    }

    /// Workers with a queued absence on `date`
    pub fn absent_on(&self, date: NaiveDate) -> impl Iterator<Item = Worker> + '_ {
        self.absences
            .iter()
            .filter(move |r| r.date == date)
            .map(|r| r.worker)
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Process-local editing state
///
/// Holds staged changes, the editor's seat selections (kept until the day is
/// committed or the editor closed) and per-seat lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pending: PendingChanges,
    selections: BTreeMap<SeatKey, Occupant>,
    states: BTreeMap<SeatKey, SeatState>,
    /// Seats flagged absent and not yet committed, with the flagged worker
    flagged: BTreeMap<SeatKey, Worker>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_pending(&mut self) -> PendingChanges {
        self.pending.take()
    }

    /// Staged free worker for `date`, if any
    pub fn staged_free(&self, date: NaiveDate) -> Option<Worker> {
        self.pending.free.get(&date).copied()
    }

    /// Stage the effects of an absence plan
    pub fn stage(&mut self, key: SeatKey, plan: &AbsencePlan, record: Option<AbsenceRecord>) {
        let (date, _, _) = key;
        self.selections.insert(key, plan.cover);
        if let Some(free) = plan.new_free {
            self.pending.free.insert(date, free);
        }
        if let Some(record) = record {
            self.flagged.insert(key, record.worker);
            self.states.insert(key, SeatState::MarkedAbsent);
            self.pending.absences.push(record);
        }
    }

    pub fn select(&mut self, key: SeatKey, occupant: Occupant) {
        self.selections.insert(key, occupant);
    }

    pub fn selection(&self, key: SeatKey) -> Option<Occupant> {
        self.selections.get(&key).copied()
    }

    /// Overlay the editor's selections for `date` onto `choices`
    pub fn overlay(&self, date: NaiveDate, choices: &mut DayChoices) {
        for (&(d, shift, seat), &occupant) in self.selections.range(day_range(date)) {
            debug_assert_eq!(d, date);
            choices.set_seat(shift, seat, occupant);
        }
    }

    /// Drop the editor's selections for `date`
    pub fn clear_selections(&mut self, date: NaiveDate) {
        let keys: Vec<SeatKey> = self.selections.range(day_range(date)).map(|(k, _)| *k).collect();
        for key in keys {
            self.selections.remove(&key);
        }
    }

    /// Drop every selection, as when the editor is closed
    pub fn discard_selections(&mut self) {
        self.selections.clear();
    }

    /// Workers flagged absent on `date` whose flagged seat does not hold them
    /// in `choices`
    pub fn held_out(&self, date: NaiveDate, choices: &DayChoices) -> BTreeSet<Worker> {
        self.flagged
            .range(day_range(date))
            .filter(|(&(_, shift, seat), &worker)| {
                choices.get(shift).get(seat) != Occupant::Assigned(worker)
            })
            .map(|(_, &worker)| worker)
            .collect()
    }

    pub fn state(&self, key: SeatKey) -> SeatState {
        self.states.get(&key).copied().unwrap_or(SeatState::Scheduled)
    }

    /// Settle seats flagged absent on `date` after the day is committed
    ///
    /// Flagged workers who ended up present go back to `Scheduled`, the rest
    /// become `Reconciled`. Returns the number restored.
    pub fn settle(&mut self, date: NaiveDate, present: &BTreeSet<Worker>) -> usize {
        let flagged: Vec<(SeatKey, Worker)> = self
            .flagged
            .range(day_range(date))
            .map(|(k, w)| (*k, *w))
            .collect();

        let mut restored = 0;
        for (key, worker) in flagged {
            self.flagged.remove(&key);
            if present.contains(&worker) {
                self.states.insert(key, SeatState::Scheduled);
                restored += 1;
            } else {
                self.states.insert(key, SeatState::Reconciled);
            }
        }
        restored
    }
}

fn day_range(date: NaiveDate) -> std::ops::RangeInclusive<SeatKey> {
    (date, ShiftKind::Morning, Seat::A)..=(date, ShiftKind::Night, Seat::B)
}
