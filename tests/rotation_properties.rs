//! Property tests for the rotation generator and the override merge

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

use turnero::models::{Occupant, ShiftKind, Worker};
use turnero::scheduler::{merge, Overrides, RotationGenerator, ShiftOverride};
use turnero::utils::monday_of_week;

fn any_anchor() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|days| {
        monday_of_week(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days))
    })
}

fn any_weekday() -> impl Strategy<Value = Option<Weekday>> {
    prop_oneof![
        Just(None),
        (0u8..7).prop_map(|d| Weekday::try_from(d).ok()),
    ]
}

fn any_worker() -> impl Strategy<Value = Worker> {
    prop::sample::select(Worker::all().to_vec())
}

fn any_occupant() -> impl Strategy<Value = Occupant> {
    prop_oneof![
        any_worker().prop_map(Occupant::Assigned),
        Just(Occupant::NeedsCoverage),
    ]
}

proptest! {
    #[test]
    fn generated_schedule_is_well_formed(
        anchor in any_anchor(),
        days in 0usize..120,
        offset in 0u32..=100,
        rest in any_weekday(),
    ) {
        let generator = RotationGenerator::new().with_floater_rest_day(rest);
        let entries = generator.generate(anchor, days, offset);

        prop_assert_eq!(entries.len(), days * 3);

        for (i, day) in entries.chunks(3).enumerate() {
            let date = anchor + Duration::days(i as i64);
            let shifts: Vec<_> = day.iter().map(|e| e.shift).collect();
            prop_assert_eq!(shifts, ShiftKind::all().to_vec());

            let free = day[0].free;
            let mut seated = BTreeSet::new();
            for entry in day {
                prop_assert_eq!(entry.date, date);
                prop_assert_eq!(entry.free, free);
                prop_assert_ne!(entry.occupant_a, entry.occupant_b);
                prop_assert!(entry.occupant_a.is_assigned() && entry.occupant_b.is_assigned());
                seated.extend(entry.seats().workers());
            }

            // Six seats, six distinct people, none of them free
            prop_assert_eq!(seated.len(), 6);
            prop_assert!(!seated.contains(&free));

            if free == Worker::FLOATER {
                for entry in day {
                    let (a, b) = entry.slot().regulars;
                    prop_assert_eq!(entry.seats(), turnero::models::SeatPair::new(a, b));
                }
            }

            if let Some(rest) = rest {
                prop_assert_eq!(free == Worker::FLOATER, date.weekday() == rest);
            }
        }
    }

    #[test]
    fn every_worker_rests_once_per_week(anchor in any_anchor(), offset in 0u32..=100) {
        let entries = RotationGenerator::new().generate(anchor, 7, offset);
        let free: BTreeSet<Worker> = entries.iter().map(|e| e.free).collect();
        prop_assert_eq!(free.len(), 7);
    }

    #[test]
    fn offset_is_applied_mod_seven(anchor in any_anchor(), offset in 0u32..=93) {
        let generator = RotationGenerator::new();
        prop_assert_eq!(
            generator.generate(anchor, 21, offset),
            generator.generate(anchor, 21, offset + 7)
        );
    }

    #[test]
    fn merge_with_no_overrides_is_identity(anchor in any_anchor(), days in 0usize..60) {
        let baseline = RotationGenerator::new().generate(anchor, days, 0);
        prop_assert_eq!(merge(&baseline, &Overrides::new()), baseline);
    }

    #[test]
    fn merge_applies_present_fields_only(
        anchor in any_anchor(),
        patches in prop::collection::vec(
            (0i64..40, 0usize..3, prop::option::of(any_occupant()), prop::option::of(any_occupant())),
            0..20,
        ),
        frees in prop::collection::vec((0i64..40, any_worker()), 0..10),
    ) {
        let baseline = RotationGenerator::new().generate(anchor, 28, 0);

        let mut overrides = Overrides::new();
        for (offset, shift, a, b) in &patches {
            let shift = ShiftKind::from_index(*shift).unwrap();
            overrides.set_shift(
                anchor + Duration::days(*offset),
                shift,
                ShiftOverride { occupant_a: *a, occupant_b: *b },
            );
        }
        let mut free_by_date = HashMap::new();
        for (offset, worker) in &frees {
            let date = anchor + Duration::days(*offset);
            overrides.set_free(date, *worker);
            free_by_date.insert(date, *worker);
        }

        let merged = merge(&baseline, &overrides);
        prop_assert_eq!(merged.len(), baseline.len());

        for (base, out) in baseline.iter().zip(&merged) {
            prop_assert_eq!(base.key(), out.key());

            let patch = overrides.shift(base.date, base.shift).copied().unwrap_or_default();
            prop_assert_eq!(out.occupant_a, patch.occupant_a.unwrap_or(base.occupant_a));
            prop_assert_eq!(out.occupant_b, patch.occupant_b.unwrap_or(base.occupant_b));
            prop_assert_eq!(out.free, free_by_date.get(&base.date).copied().unwrap_or(base.free));
        }
    }
}
