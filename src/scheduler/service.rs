//! Schedule coordinator
//!
//! [`ScheduleService`] owns the rotation settings, the generated baseline, the
//! effective (merged) schedule and the editing [`Session`]. Every write goes
//! through a repository and is followed by a reload and re-merge, so the
//! effective view always matches what is stored.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

use super::error::SchedulerError;
use super::hours::{self, HoursSummary};
use super::merge::merge;
use super::reconcile::{plan_absence, resolve_free, AbsencePlan, SeatState, Session};
use super::rotation::RotationGenerator;
use crate::config::RotationSettings;
use crate::error::Result;
use crate::models::{AbsenceRecord, DayChoices, Occupant, ScheduleEntry, Seat, ShiftKind, Worker};
use crate::storage::{SharedAbsenceLog, SharedOverrideStore};
use crate::utils::local_now;

/// Outcome of committing a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub date: NaiveDate,
    /// Free worker persisted for the day
    pub free: Worker,
    /// Absence records deleted because the worker was seated after all
    pub retracted: usize,
}

/// Single-process coordinator of the schedule
pub struct ScheduleService {
    settings: RotationSettings,
    generator: RotationGenerator,
    anchor: NaiveDate,
    baseline: Vec<ScheduleEntry>,
    effective: Vec<ScheduleEntry>,
    overrides: SharedOverrideStore,
    absences: SharedAbsenceLog,
    session: Session,
}

impl ScheduleService {
    /// Generate the baseline for `settings` and merge stored overrides onto it
    pub fn new(
        settings: RotationSettings,
        overrides: SharedOverrideStore,
        absences: SharedAbsenceLog,
    ) -> Result<Self> {
        settings.validate()?;

        let mut service = Self {
            generator: RotationGenerator::new().with_floater_rest_day(settings.floater_rest_weekday),
            anchor: settings.normalized_anchor(),
            settings,
            baseline: Vec::new(),
            effective: Vec::new(),
            overrides,
            absences,
            session: Session::new(),
        };
        service.regenerate();
        service.reload()?;
        Ok(service)
    }

    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// Apply new rotation settings
    ///
    /// The baseline is regenerated only when the settings changed. Returns
    /// whether it was.
    pub fn reconfigure(&mut self, settings: RotationSettings) -> Result<bool> {
        if settings == self.settings {
            return Ok(false);
        }
        settings.validate()?;

        // Staged edits are date-keyed; write them before the range changes
        self.apply_pending()?;
        self.session = Session::new();

        self.generator = self
            .generator
            .clone()
            .with_floater_rest_day(settings.floater_rest_weekday);
        self.anchor = settings.normalized_anchor();
        self.settings = settings;
        self.regenerate();
        self.reload()?;
        Ok(true)
    }

    fn regenerate(&mut self) {
        self.baseline = self.generator.generate(
            self.anchor,
            self.settings.day_count(),
            self.settings.effective_offset(),
        );
        tracing::info!(
            anchor = %self.anchor,
            days = self.settings.day_count(),
            offset = self.settings.offset,
            "Baseline regenerated"
        );
    }

    /// Re-read overrides and rebuild the effective schedule
    pub fn reload(&mut self) -> Result<()> {
        let overrides = self.overrides.load()?;
        self.effective = merge(&self.baseline, &overrides);
        Ok(())
    }

    /// First and last generated date
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        let days = self.settings.day_count() as i64;
        (self.anchor, self.anchor + Duration::days(days.max(1) - 1))
    }

    pub fn baseline(&self) -> &[ScheduleEntry] {
        &self.baseline
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn day_offset(&self, date: NaiveDate) -> Option<usize> {
        let days = (date - self.anchor).num_days();
        let days = usize::try_from(days).ok()?;
        (days < self.settings.day_count()).then_some(days * 3)
    }

    /// The three effective entries of `date`
    pub fn day(&self, date: NaiveDate) -> Result<&[ScheduleEntry]> {
        let start = self
            .day_offset(date)
            .ok_or(SchedulerError::day_not_found(date))?;
        self.effective
            .get(start..start + 3)
            .ok_or_else(|| SchedulerError::day_not_found(date).into())
    }

    /// Effective entry of one shift
    pub fn entry(&self, date: NaiveDate, shift: ShiftKind) -> Result<&ScheduleEntry> {
        self.day_offset(date)
            .and_then(|start| self.effective.get(start + shift.index()))
            .ok_or_else(|| SchedulerError::entry_not_found(date, shift).into())
    }

    /// Effective entries between `from` and `to` inclusive
    ///
    /// Dates outside the generated range are skipped.
    pub fn effective_schedule(&self, from: NaiveDate, to: NaiveDate) -> Vec<ScheduleEntry> {
        self.effective
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .cloned()
            .collect()
    }

    /// Free worker of `date`, including a change staged in this cycle
    pub fn free_worker(&self, date: NaiveDate) -> Result<Worker> {
        let entry = self.entry(date, ShiftKind::Morning)?;
        Ok(self.session.staged_free(date).unwrap_or(entry.free))
    }

    /// Generated free worker of `date`, ignoring overrides
    pub fn baseline_free(&self, date: NaiveDate) -> Result<Worker> {
        self.day_offset(date)
            .and_then(|start| self.baseline.get(start))
            .map(|e| e.free)
            .ok_or_else(|| SchedulerError::day_not_found(date).into())
    }

    /// Seat values as the editor shows them: effective schedule plus selections
    pub fn day_choices(&self, date: NaiveDate) -> Result<DayChoices> {
        let mut choices =
            DayChoices::from_entries(self.day(date)?).ok_or(SchedulerError::day_not_found(date))?;
        self.session.overlay(date, &mut choices);
        Ok(choices)
    }

    pub fn seat_state(&self, date: NaiveDate, shift: ShiftKind, seat: Seat) -> SeatState {
        self.session.state((date, shift, seat))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Scheduled hours per worker between `from` and `to`
    pub fn hours_worked(&self, from: NaiveDate, to: NaiveDate) -> Vec<HoursSummary> {
        hours::summarize(&self.effective_schedule(from, to))
    }

    /// Logged absences between `from` and `to`
    pub fn absences_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AbsenceRecord>> {
        Ok(self.absences.list_range(from, to)?)
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Record the editor's choice for one seat without saving it
    pub fn select_seat(
        &mut self,
        date: NaiveDate,
        shift: ShiftKind,
        seat: Seat,
        occupant: Occupant,
    ) -> Result<()> {
        self.entry(date, shift)?;
        self.session.select((date, shift, seat), occupant);
        Ok(())
    }

    /// Flag the occupant of a seat absent
    ///
    /// The day's free worker is put in the seat when available, the absent
    /// worker becomes free and an absence record is queued. Nothing is written
    /// until [`Self::apply_pending`].
    pub fn stage_absence(
        &mut self,
        date: NaiveDate,
        shift: ShiftKind,
        seat: Seat,
    ) -> Result<AbsencePlan> {
        self.entry(date, shift)?;

        let choices = self.day_choices(date)?;
        let free = self.free_worker(date)?;

        let mut absent_today: BTreeSet<Worker> = self
            .absences
            .for_date(date)?
            .into_iter()
            .map(|r| r.worker)
            .collect();
        absent_today.extend(self.session.pending().absent_on(date));

        let plan = plan_absence(&choices, free, shift, seat, &absent_today);
        let record = plan
            .absent
            .map(|worker| AbsenceRecord::new(date, shift, seat, worker, local_now()));

        tracing::info!(
            date = %date,
            shift = %shift,
            seat = %seat,
            absent = ?plan.absent,
            cover = %plan.cover,
            "Absence staged"
        );

        self.session.stage((date, shift, seat), &plan, record);
        Ok(plan)
    }

    /// Write staged free changes and queued absences, then re-merge
    ///
    /// Returns the number of writes performed. Staged changes stay queued if a
    /// write fails.
    pub fn apply_pending(&mut self) -> Result<usize> {
        if !self.session.has_pending() {
            return Ok(0);
        }

        let pending = self.session.pending().clone();
        for (&date, &free) in &pending.free {
            self.overrides.upsert_free_only(date, free)?;
        }
        for record in &pending.absences {
            self.absences.append(record)?;
        }
        self.session.take_pending();

        let writes = pending.free.len() + pending.absences.len();
        tracing::info!(
            free_changes = pending.free.len(),
            absences = pending.absences.len(),
            "Applied pending changes"
        );

        self.reload()?;
        Ok(writes)
    }

    /// Save the seat choices of a whole day
    ///
    /// Pending changes are applied first and the day's effective free worker is
    /// persisted with the seats. Absences of workers who ended up seated are
    /// retracted; the free designation moves only when the free worker is back
    /// in the seat they were flagged from, or was not flagged this cycle.
    pub fn commit_day(&mut self, date: NaiveDate, choices: DayChoices) -> Result<CommitReport> {
        self.day(date)?;

        for (shift, pair) in choices.iter() {
            if pair.is_doubled() {
                if let Occupant::Assigned(worker) = pair.a {
                    return Err(SchedulerError::DuplicateOccupant { date, shift, worker }.into());
                }
            }
        }

        self.apply_pending()?;

        let current = self.free_worker(date)?;
        let baseline = self.baseline_free(date)?;
        let held_out = self.session.held_out(date, &choices);
        let free = resolve_free(&choices, current, baseline, &held_out);
        if free != current {
            tracing::info!(date = %date, from = %current, to = %free, "Free worker reassigned");
        }

        self.overrides.upsert_day(date, &choices, Some(free))?;

        let present = choices.present_workers();
        let retracted = self.absences.remove_present(date, &present)?;

        self.session.settle(date, &present);
        self.session.clear_selections(date);
        self.reload()?;

        tracing::info!(date = %date, free = %free, retracted, "Day committed");

        Ok(CommitReport {
            date,
            free,
            retracted,
        })
    }

    /// Discard every unsaved seat selection
    pub fn close_editor(&mut self) {
        self.session.discard_selections();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatPair;
    use crate::storage::{AbsenceLog, MockAbsenceLog, MockOverrideStore};
    use std::sync::Arc;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn settings() -> RotationSettings {
        RotationSettings {
            anchor: monday(),
            horizon_months: 1,
            offset: 0,
            floater_rest_weekday: None,
        }
    }

    fn service() -> (ScheduleService, Arc<MockAbsenceLog>) {
        let log = Arc::new(MockAbsenceLog::new());
        let service = ScheduleService::new(
            settings(),
            Arc::new(MockOverrideStore::new()),
            log.clone(),
        )
        .unwrap();
        (service, log)
    }

    #[test]
    fn test_lookup_by_position() {
        let (service, _) = service();
        let entry = service.entry(monday(), ShiftKind::Morning).unwrap();
        assert_eq!(entry.occupant_a, Occupant::Assigned(Worker::Alina));
        assert_eq!(service.free_worker(monday()).unwrap(), Worker::Moira);

        let last = service.range().1;
        assert_eq!(last, monday() + Duration::days(44));
        assert!(service.day(last).is_ok());
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        let (mut service, _) = service();
        let before = monday() - Duration::days(1);
        let after = service.range().1 + Duration::days(1);

        for date in [before, after] {
            assert!(matches!(
                service.free_worker(date),
                Err(crate::error::Error::Scheduler(SchedulerError::EntryNotFound { .. }))
            ));
            assert!(service.stage_absence(date, ShiftKind::Night, Seat::A).is_err());
        }
        assert!(service.effective_schedule(before, before).is_empty());
    }

    #[test]
    fn test_stage_then_apply() {
        let (mut service, log) = service();
        let plan = service
            .stage_absence(monday(), ShiftKind::Night, Seat::B)
            .unwrap();
        assert_eq!(plan.cover, Occupant::Assigned(Worker::Moira));

        // Staged, not written
        assert!(log.is_empty());
        assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jony);
        assert_eq!(
            service.seat_state(monday(), ShiftKind::Night, Seat::B),
            SeatState::MarkedAbsent
        );
        assert_eq!(
            service.day_choices(monday()).unwrap().get(ShiftKind::Night).b,
            Occupant::Assigned(Worker::Moira)
        );

        assert_eq!(service.apply_pending().unwrap(), 2);
        assert_eq!(log.len(), 1);
        assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jony);
        assert_eq!(service.apply_pending().unwrap(), 0);
    }

    #[test]
    fn test_second_absence_same_day_needs_coverage() {
        let (mut service, _) = service();
        service
            .stage_absence(monday(), ShiftKind::Night, Seat::B)
            .unwrap();

        // Jony is now free but absent himself; Moira sits in the night shift
        let plan = service
            .stage_absence(monday(), ShiftKind::Afternoon, Seat::A)
            .unwrap();
        assert_eq!(plan.cover, Occupant::NeedsCoverage);
        assert_eq!(plan.new_free, Some(Worker::Jere));
    }

    #[test]
    fn test_commit_rejects_doubled_shift() {
        let (mut service, _) = service();
        let mut choices = service.day_choices(monday()).unwrap();
        choices.set(ShiftKind::Morning, SeatPair::new(Worker::Brisa, Worker::Brisa));

        let err = service.commit_day(monday(), choices).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Scheduler(SchedulerError::DuplicateOccupant {
                worker: Worker::Brisa,
                ..
            })
        ));
    }

    #[test]
    fn test_commit_unchanged_day_keeps_cascade() {
        let (mut service, log) = service();
        service
            .stage_absence(monday(), ShiftKind::Night, Seat::B)
            .unwrap();
        let choices = service.day_choices(monday()).unwrap();

        let report = service.commit_day(monday(), choices).unwrap();
        assert_eq!(report.free, Worker::Jony);
        assert_eq!(report.retracted, 0);
        assert_eq!(log.for_date(monday()).unwrap().len(), 1);
        assert_eq!(
            service.entry(monday(), ShiftKind::Night).unwrap().occupant_b,
            Occupant::Assigned(Worker::Moira)
        );
        assert_eq!(
            service.seat_state(monday(), ShiftKind::Night, Seat::B),
            SeatState::Reconciled
        );
    }

    #[test]
    fn test_reconfigure_only_when_changed() {
        let (mut service, _) = service();
        assert!(!service.reconfigure(settings()).unwrap());

        let mut shifted = settings();
        shifted.offset = 1;
        assert!(service.reconfigure(shifted).unwrap());
        assert_eq!(service.free_worker(monday()).unwrap(), Worker::Brisa);

        let mut invalid = settings();
        invalid.horizon_months = 0;
        assert!(service.reconfigure(invalid).is_err());
    }

    #[test]
    fn test_reconfigure_writes_staged_edits_and_resets_session() {
        let (mut service, log) = service();
        service
            .stage_absence(monday(), ShiftKind::Night, Seat::B)
            .unwrap();
        service
            .select_seat(monday(), ShiftKind::Morning, Seat::A, Occupant::NeedsCoverage)
            .unwrap();

        let mut shifted = settings();
        shifted.offset = 1;
        shifted.horizon_months = 2;
        assert!(service.reconfigure(shifted).unwrap());

        assert!(!service.session().has_pending());
        assert_eq!(
            service.seat_state(monday(), ShiftKind::Night, Seat::B),
            SeatState::Scheduled
        );
        // The selection is gone, the staged free and absence were written
        assert_eq!(
            service.day_choices(monday()).unwrap().get(ShiftKind::Morning).a,
            Occupant::Assigned(Worker::Moira)
        );
        assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jony);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_close_editor_discards_selections() {
        let (mut service, _) = service();
        service
            .select_seat(monday(), ShiftKind::Morning, Seat::A, Occupant::NeedsCoverage)
            .unwrap();
        assert_eq!(
            service.day_choices(monday()).unwrap().get(ShiftKind::Morning).a,
            Occupant::NeedsCoverage
        );

        service.close_editor();
        assert_eq!(
            service.day_choices(monday()).unwrap().get(ShiftKind::Morning).a,
            Occupant::Assigned(Worker::Alina)
        );
    }
}
