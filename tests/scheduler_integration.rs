//! Integration tests for the schedule coordinator
//!
//! These tests verify the complete workflow of:
//! - Baseline generation and lookup
//! - Absence staging, apply and commit
//! - Absence retraction and free reassignment
//! - Overrides surviving regeneration

mod common;

use std::sync::Arc;

use common::{day, monday, settings};
use turnero::error::Error;
use turnero::models::{Occupant, Seat, SeatPair, ShiftKind, Worker};
use turnero::scheduler::{ScheduleService, SchedulerError, SeatState};
use turnero::storage::{AbsenceLog, MockAbsenceLog, MockOverrideStore, OverrideStore};

// ============================================================================
// Baseline
// ============================================================================

#[test]
fn test_first_monday_of_2024() {
    let (service, _) = common::mock_service();
    let entries = service.effective_schedule(monday(), monday());

    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.free == Worker::Moira));

    assert_eq!(entries[0].shift, ShiftKind::Morning);
    assert_eq!(entries[0].seats(), SeatPair::new(Worker::Alina, Worker::Brisa));
    assert_eq!(entries[1].seats(), SeatPair::new(Worker::Jere, Worker::Dianela));
    assert_eq!(entries[2].seats(), SeatPair::new(Worker::Hugo, Worker::Jony));
}

#[test]
fn test_lookup_outside_range_is_not_found() {
    let (mut service, _) = common::mock_service();
    let (_, last) = service.range();
    let outside = last + chrono::Duration::days(1);

    let err = service.free_worker(outside).unwrap_err();
    assert!(matches!(
        err,
        Error::Scheduler(SchedulerError::EntryNotFound { date, .. }) if date == outside
    ));

    let choices = service.day_choices(monday()).unwrap();
    assert!(service.commit_day(outside, choices).is_err());
    assert!(service
        .select_seat(outside, ShiftKind::Morning, Seat::A, Occupant::NeedsCoverage)
        .is_err());
}

#[test]
fn test_anchor_at_end_of_calendar_is_rejected() {
    let mut near_end = settings();
    near_end.anchor = chrono::NaiveDate::MAX - chrono::Duration::days(10);

    let result = ScheduleService::new(
        near_end,
        Arc::new(MockOverrideStore::new()),
        Arc::new(MockAbsenceLog::new()),
    );
    assert!(matches!(
        result,
        Err(Error::Scheduler(SchedulerError::InvalidSettings { .. }))
    ));
}

// ============================================================================
// Absence cascade
// ============================================================================

#[test]
fn test_absence_cascade_then_commit_unchanged() {
    let (mut service, log) = common::mock_service();

    service
        .stage_absence(monday(), ShiftKind::Night, Seat::B)
        .unwrap();
    let choices = service.day_choices(monday()).unwrap();
    let report = service.commit_day(monday(), choices).unwrap();

    assert_eq!(report.free, Worker::Jony);
    assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jony);

    let night = service.entry(monday(), ShiftKind::Night).unwrap();
    assert_eq!(night.occupant_b, Occupant::Assigned(Worker::Moira));

    let logged = log.for_date(monday()).unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].worker, Worker::Jony);
    assert_eq!(logged[0].reason, "FALTA");

    // Next day untouched
    assert_eq!(service.free_worker(day(1)).unwrap(), Worker::Brisa);
}

#[test]
fn test_two_absences_leave_a_seat_uncovered() {
    let (mut service, log) = common::mock_service();

    service
        .stage_absence(monday(), ShiftKind::Night, Seat::B)
        .unwrap();
    let plan = service
        .stage_absence(monday(), ShiftKind::Night, Seat::A)
        .unwrap();
    assert_eq!(plan.cover, Occupant::NeedsCoverage);

    let choices = service.day_choices(monday()).unwrap();
    let report = service.commit_day(monday(), choices).unwrap();

    assert_eq!(report.free, Worker::Hugo);
    assert_eq!(log.len(), 2);

    let night = service.entry(monday(), ShiftKind::Night).unwrap();
    assert_eq!(night.occupant_a, Occupant::NeedsCoverage);
    assert_eq!(night.occupant_b, Occupant::Assigned(Worker::Moira));

    let hours = service.hours_worked(monday(), monday());
    assert_eq!(hours.iter().map(|h| h.hours).sum::<u32>(), 40);
    assert!(hours.iter().all(|h| h.worker != Worker::Hugo));
}

// ============================================================================
// Retraction
// ============================================================================

#[test]
fn test_worker_back_in_seat_retracts_absence() {
    let (mut service, log) = common::mock_service();

    service
        .stage_absence(monday(), ShiftKind::Night, Seat::B)
        .unwrap();
    let choices = service.day_choices(monday()).unwrap();
    service.commit_day(monday(), choices).unwrap();
    assert_eq!(log.len(), 1);

    // Jony turned up after all
    let mut choices = service.day_choices(monday()).unwrap();
    choices.set(ShiftKind::Night, SeatPair::new(Worker::Hugo, Worker::Jony));
    let report = service.commit_day(monday(), choices).unwrap();

    assert_eq!(report.retracted, 1);
    assert!(log.for_date(monday()).unwrap().is_empty());
    assert_eq!(report.free, Worker::Moira);
    assert_eq!(service.free_worker(monday()).unwrap(), Worker::Moira);
}

#[test]
fn test_restored_seat_goes_back_to_scheduled() {
    let (mut service, _) = common::mock_service();

    service
        .stage_absence(monday(), ShiftKind::Morning, Seat::B)
        .unwrap();
    assert_eq!(
        service.seat_state(monday(), ShiftKind::Morning, Seat::B),
        SeatState::MarkedAbsent
    );

    let mut choices = service.day_choices(monday()).unwrap();
    choices.set_seat(ShiftKind::Morning, Seat::B, Occupant::Assigned(Worker::Brisa));
    service.commit_day(monday(), choices).unwrap();

    assert_eq!(
        service.seat_state(monday(), ShiftKind::Morning, Seat::B),
        SeatState::Scheduled
    );
}

#[test]
fn test_seated_free_worker_falls_back_to_rotation_order() {
    let (mut service, _) = common::mock_service();

    // Moira takes Jere's afternoon seat on her day off
    let mut choices = service.day_choices(monday()).unwrap();
    choices.set_seat(ShiftKind::Afternoon, Seat::A, Occupant::Assigned(Worker::Moira));
    let report = service.commit_day(monday(), choices).unwrap();

    assert_eq!(report.free, Worker::Jere);

    // The free worker then covers the next absence
    let plan = service
        .stage_absence(monday(), ShiftKind::Night, Seat::A)
        .unwrap();
    assert_eq!(plan.cover, Occupant::Assigned(Worker::Jere));
}

#[test]
fn test_absent_worker_with_second_shift_stays_free() {
    let (mut service, _) = common::mock_service();

    // Jony picks up Jere's afternoon seat as well as his own night seat
    service
        .select_seat(
            monday(),
            ShiftKind::Afternoon,
            Seat::A,
            Occupant::Assigned(Worker::Jony),
        )
        .unwrap();
    let choices = service.day_choices(monday()).unwrap();
    assert_eq!(service.commit_day(monday(), choices).unwrap().free, Worker::Moira);

    // He then misses the night shift
    let plan = service
        .stage_absence(monday(), ShiftKind::Night, Seat::B)
        .unwrap();
    assert_eq!(plan.absent, Some(Worker::Jony));
    assert_eq!(plan.cover, Occupant::Assigned(Worker::Moira));

    let choices = service.day_choices(monday()).unwrap();
    let report = service.commit_day(monday(), choices).unwrap();

    assert_eq!(report.free, Worker::Jony);
    assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jony);
    assert_eq!(
        service.entry(monday(), ShiftKind::Night).unwrap().occupant_b,
        Occupant::Assigned(Worker::Moira)
    );
    assert_eq!(
        service.entry(monday(), ShiftKind::Afternoon).unwrap().occupant_a,
        Occupant::Assigned(Worker::Jony)
    );
}

// ============================================================================
// Persistence behaviour
// ============================================================================

#[test]
fn test_commit_is_idempotent() {
    let store = Arc::new(MockOverrideStore::new());
    let mut service = ScheduleService::new(
        settings(),
        store.clone(),
        Arc::new(MockAbsenceLog::new()),
    )
    .unwrap();

    let mut choices = service.day_choices(day(2)).unwrap();
    choices.set_seat(ShiftKind::Morning, Seat::A, Occupant::NeedsCoverage);

    service.commit_day(day(2), choices).unwrap();
    let once_store = store.load().unwrap();
    let once_view = service.effective_schedule(monday(), day(6));

    service.commit_day(day(2), choices).unwrap();
    assert_eq!(store.load().unwrap(), once_store);
    assert_eq!(service.effective_schedule(monday(), day(6)), once_view);
}

#[test]
fn test_overrides_survive_regeneration() {
    let (mut service, _) = common::mock_service();

    let mut choices = service.day_choices(monday()).unwrap();
    choices.set_seat(ShiftKind::Afternoon, Seat::A, Occupant::Assigned(Worker::Moira));
    service.commit_day(monday(), choices).unwrap();

    let mut shifted = settings();
    shifted.offset = 1;
    shifted.horizon_months = 2;
    assert!(service.reconfigure(shifted).unwrap());

    // The committed day keeps its seats and free worker
    assert_eq!(service.free_worker(monday()).unwrap(), Worker::Jere);
    assert_eq!(
        service.entry(monday(), ShiftKind::Afternoon).unwrap().occupant_a,
        Occupant::Assigned(Worker::Moira)
    );
    assert_eq!(service.baseline_free(monday()).unwrap(), Worker::Brisa);

    // Other days follow the new rotation
    assert_eq!(service.free_worker(day(1)).unwrap(), Worker::Jere);
    assert_eq!(service.range().1, day(31 * 2 + 14 - 1));
}

#[test]
fn test_doubled_shift_is_rejected_without_writes() {
    let store = Arc::new(MockOverrideStore::new());
    let mut service = ScheduleService::new(
        settings(),
        store.clone(),
        Arc::new(MockAbsenceLog::new()),
    )
    .unwrap();

    let mut choices = service.day_choices(monday()).unwrap();
    choices.set(ShiftKind::Night, SeatPair::new(Worker::Hugo, Worker::Hugo));

    assert!(service.commit_day(monday(), choices).is_err());
    assert!(store.load().unwrap().is_empty());
}
