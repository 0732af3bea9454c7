//! Deterministic day-off rotation
//!
//! Every day exactly one of the seven workers is free. The free worker is picked
//! from a fixed rotation order by `(week_index + weekday + offset) mod 7`, so each
//! person gets one day off per week and the weekday it falls on shifts by one
//! every week. When a regular is free, the floater takes their seat; when the
//! floater is free, every regular works their own seat.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{Occupant, ScheduleEntry, SeatPair, ShiftKind, Worker};

/// Fixed order in which the day off rotates
pub const ROTATION_ORDER: [Worker; 7] = [
    Worker::Moira,
    Worker::Brisa,
    Worker::Jere,
    Worker::Dianela,
    Worker::Hugo,
    Worker::Jony,
    Worker::Alina,
];

// ============================================================================
// Rotation Generator
// ============================================================================

/// Produces baseline schedules
///
/// The generator is pure: the same anchor, day count and offset always yield
/// the same entries, in date order and then morning, afternoon, night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationGenerator {
    order: [Worker; 7],
    /// Weekday on which the floater always rests, if pinned
    floater_rest: Option<Weekday>,
}

impl RotationGenerator {
    /// Create a generator with the standard seven-way rotation
    pub fn new() -> Self {
        Self {
            order: ROTATION_ORDER,
            floater_rest: None,
        }
    }

    /// Pin the floater's day off to a fixed weekday
    ///
    /// The six regulars then rotate over the remaining six weekdays.
    pub fn with_floater_rest_day(mut self, weekday: Option<Weekday>) -> Self {
        self.floater_rest = weekday;
        self
    }

    pub fn floater_rest_day(&self) -> Option<Weekday> {
        self.floater_rest
    }

    /// Free worker for the `day_index`-th day after the anchor
    ///
    /// `date` must be `anchor + day_index`; its real weekday drives the rotation.
    pub fn free_for(&self, day_index: usize, date: NaiveDate, offset: u32) -> Worker {
        let weekday = date.weekday().num_days_from_monday() as usize;
        let week_index = day_index / 7;
        let offset = offset as usize;

        match self.floater_rest {
            None => self.order[(week_index + weekday + offset) % 7],
            Some(rest) if date.weekday() == rest => Worker::FLOATER,
            Some(rest) => {
                let regulars: Vec<Worker> = self
                    .order
                    .iter()
                    .copied()
                    .filter(|w| !w.is_floater())
                    .collect();
                let rest_index = rest.num_days_from_monday() as usize;
                let position = if weekday > rest_index {
                    weekday - 1
                } else {
                    weekday
                };
                regulars[(week_index + position + offset) % regulars.len()]
            }
        }
    }

    /// Generate `day_count` days of schedule starting at `anchor`
    ///
    /// `anchor` is expected to be a Monday; callers normalize it with
    /// [`crate::utils::monday_of_week`].
    ///
    /// # Example
    /// ```
    /// use turnero::scheduler::RotationGenerator;
    /// use turnero::models::{Occupant, Worker};
    /// use chrono::NaiveDate;
    ///
    /// let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let entries = RotationGenerator::new().generate(anchor, 7, 0);
    /// assert_eq!(entries.len(), 21);
    /// assert_eq!(entries[0].free, Worker::Moira);
    /// assert_eq!(entries[0].occupant_a, Occupant::Assigned(Worker::Alina));
    /// ```
    pub fn generate(&self, anchor: NaiveDate, day_count: usize, offset: u32) -> Vec<ScheduleEntry> {
        if anchor.weekday() != Weekday::Mon {
            tracing::warn!(anchor = %anchor, weekday = ?anchor.weekday(), "Rotation anchor is not a Monday");
        }

        let mut entries = Vec::with_capacity(day_count * 3);

        for day_index in 0..day_count {
            let Some(date) = anchor.checked_add_signed(Duration::days(day_index as i64)) else {
                tracing::warn!(anchor = %anchor, day_index, "Rotation stopped at the end of the calendar");
                break;
            };
            let free = self.free_for(day_index, date, offset);

            for shift in ShiftKind::all() {
                let seats = cover(shift, free);
                entries.push(ScheduleEntry {
                    date,
                    shift,
                    occupant_a: seats.a,
                    occupant_b: seats.b,
                    free,
                });
            }
        }

        tracing::debug!(
            anchor = %anchor,
            days = day_count,
            offset,
            entries = entries.len(),
            "Generated baseline rotation"
        );

        entries
    }
}

impl Default for RotationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a baseline schedule with the standard rotation
pub fn generate(anchor: NaiveDate, day_count: usize, offset: u32) -> Vec<ScheduleEntry> {
    RotationGenerator::new().generate(anchor, day_count, offset)
}

/// Seats of `shift` on a day when `free` is off
///
/// The floater steps into the free regular's seat; nothing changes when the free
/// worker is not a regular of this shift.
pub fn cover(shift: ShiftKind, free: Worker) -> SeatPair {
    let (a, b) = shift.slot().regulars;
    let floater = Occupant::Assigned(Worker::FLOATER);

    if free == a {
        SeatPair {
            a: floater,
            b: Occupant::Assigned(b),
        }
    } else if free == b {
        SeatPair {
            a: Occupant::Assigned(a),
            b: floater,
        }
    } else {
        SeatPair::new(a, b)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_rotation_order_covers_everyone() {
        let unique: HashSet<_> = ROTATION_ORDER.iter().collect();
        assert_eq!(unique.len(), 7);
        assert_eq!(ROTATION_ORDER[6], Worker::FLOATER);
    }

    #[test]
    fn test_first_monday_scenario() {
        let entries = generate(monday(), 7, 0);

        let morning = &entries[0];
        assert_eq!(morning.free, Worker::Moira);
        assert_eq!(morning.shift, ShiftKind::Morning);
        assert_eq!(morning.occupant_a, Occupant::Assigned(Worker::Alina));
        assert_eq!(morning.occupant_b, Occupant::Assigned(Worker::Brisa));

        assert_eq!(entries[1].seats(), SeatPair::new(Worker::Jere, Worker::Dianela));
        assert_eq!(entries[2].seats(), SeatPair::new(Worker::Hugo, Worker::Jony));
    }

    #[test]
    fn test_week_shifts_day_off_by_one() {
        let entries = generate(monday(), 14, 0);
        // Week 0 Monday: order[0]; week 1 Monday: order[1]
        assert_eq!(entries[0].free, Worker::Moira);
        assert_eq!(entries[7 * 3].free, Worker::Brisa);
        // Week 0 Sunday: order[6]
        assert_eq!(entries[6 * 3].free, Worker::Alina);
    }

    #[test]
    fn test_everyone_free_once_per_week() {
        for offset in 0..7 {
            let entries = generate(monday(), 7, offset);
            let free: HashSet<_> = entries.iter().map(|e| e.free).collect();
            assert_eq!(free.len(), 7, "offset {offset}");
        }
    }

    #[test]
    fn test_offset_is_modular() {
        assert_eq!(generate(monday(), 21, 2), generate(monday(), 21, 9));
    }

    #[test]
    fn test_floater_free_leaves_regulars_in_place() {
        // Sunday of week 0 with offset 0 is Alina's day off
        let entries = generate(monday(), 7, 0);
        for entry in &entries[18..21] {
            assert_eq!(entry.free, Worker::Alina);
            let (a, b) = entry.shift.slot().regulars;
            assert_eq!(entry.seats(), SeatPair::new(a, b));
        }
    }

    #[test]
    fn test_cover_seat_b() {
        let seats = cover(ShiftKind::Night, Worker::Jony);
        assert_eq!(seats, SeatPair::new(Worker::Hugo, Worker::Alina));

        let untouched = cover(ShiftKind::Night, Worker::Moira);
        assert_eq!(untouched, SeatPair::new(Worker::Hugo, Worker::Jony));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = RotationGenerator::new();
        let first = generator.generate(monday(), 60, 3);
        let second = generator.generate(monday(), 60, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_floater_rest_day_variant() {
        let generator = RotationGenerator::new().with_floater_rest_day(Some(Weekday::Wed));
        let entries = generator.generate(monday(), 14, 0);

        for day in entries.chunks(3) {
            if day[0].date.weekday() == Weekday::Wed {
                assert_eq!(day[0].free, Worker::Alina);
            } else {
                assert_ne!(day[0].free, Worker::Alina);
            }
        }

        // Each regular is free exactly once per week
        for week in entries.chunks(21) {
            let free: HashSet<_> = week.iter().map(|e| e.free).collect();
            assert_eq!(free.len(), 7);
        }
    }

    #[test]
    fn test_zero_days() {
        assert!(generate(monday(), 0, 0).is_empty());
    }

    #[test]
    fn test_generation_stops_at_last_representable_date() {
        let entries = generate(NaiveDate::MAX - Duration::days(2), 10, 0);
        assert_eq!(entries.len(), 9);
        assert_eq!(entries.last().map(|e| e.date), Some(NaiveDate::MAX));
    }
}
