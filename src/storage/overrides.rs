//! Override store: manual seat changes and per-day free designations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;
use std::sync::{Arc, RwLock};

use super::{format_date, lock, parse_date, poisoned, SharedConnection};
use crate::models::{DayChoices, Occupant, ShiftKind, Worker};
use crate::scheduler::merge::{Overrides, ShiftOverride};

/// Durable mapping of overrides
///
/// Overrides accumulate indefinitely; a write for an existing key updates it in
/// place.
pub trait OverrideStore: Send + Sync {
    /// Load every override
    fn load(&self) -> Result<Overrides>;

    /// Persist the seats of all three shifts of `date`, and the free worker when
    /// given, as one atomic write
    fn upsert_day(&self, date: NaiveDate, values: &DayChoices, free: Option<Worker>) -> Result<()>;

    /// Change only the free designation of `date`
    fn upsert_free_only(&self, date: NaiveDate, free: Worker) -> Result<()>;
}

/// Thread-safe shared override store
pub type SharedOverrideStore = Arc<dyn OverrideStore>;

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`OverrideStore`]
pub struct SqliteOverrideStore {
    conn: SharedConnection,
}

impl SqliteOverrideStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

type RawShiftRow = (String, String, Option<String>, Option<String>);

fn parse_occupant(raw: Option<String>) -> Result<Option<Occupant>> {
    raw.map(|token| Occupant::from_token(&token))
        .transpose()
        .context("Malformed occupant in shift_overrides")
}

impl OverrideStore for SqliteOverrideStore {
    fn load(&self) -> Result<Overrides> {
        let conn = lock(&self.conn)?;
        let mut overrides = Overrides::new();

        let mut stmt = conn
            .prepare("SELECT date, shift, occupant_a, occupant_b FROM shift_overrides")
            .context("Failed to prepare override query")?;
        let rows: Vec<RawShiftRow> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
            .collect::<rusqlite::Result<_>>()
            .context("Failed to read shift_overrides")?;

        for (date, shift, a, b) in rows {
            let date = parse_date(&date)?;
            let shift = ShiftKind::from_id(&shift).context("Malformed shift in shift_overrides")?;
            overrides.set_shift(
                date,
                shift,
                ShiftOverride {
                    occupant_a: parse_occupant(a)?,
                    occupant_b: parse_occupant(b)?,
                },
            );
        }

        let mut stmt = conn
            .prepare("SELECT date, free FROM day_free")
            .context("Failed to prepare day_free query")?;
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()
            .context("Failed to read day_free")?;

        for (date, free) in rows {
            let date = parse_date(&date)?;
            let free = Worker::from_name(&free).context("Malformed worker in day_free")?;
            overrides.set_free(date, free);
        }

        tracing::debug!(
            shifts = overrides.shifts.len(),
            days = overrides.free.len(),
            "Loaded overrides"
        );
        Ok(overrides)
    }

    fn upsert_day(&self, date: NaiveDate, values: &DayChoices, free: Option<Worker>) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction().context("Failed to begin transaction")?;
        let day = format_date(date);

        for (shift, pair) in values.iter() {
            tx.execute(
                r#"
                    INSERT INTO shift_overrides (date, shift, occupant_a, occupant_b)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(date, shift) DO UPDATE SET
                        occupant_a = excluded.occupant_a,
                        occupant_b = excluded.occupant_b
                    "#,
                params![day, shift.id(), pair.a.as_token(), pair.b.as_token()],
            )
            .with_context(|| format!("Failed to upsert {shift} override for {day}"))?;
        }

        if let Some(free) = free {
            tx.execute(
                r#"
                    INSERT INTO day_free (date, free) VALUES (?1, ?2)
                    ON CONFLICT(date) DO UPDATE SET free = excluded.free
                    "#,
                params![day, free.name()],
            )
            .with_context(|| format!("Failed to upsert free worker for {day}"))?;
        }

        tx.commit().context("Failed to commit day overrides")?;

        tracing::debug!(date = %day, free = ?free, "Persisted day overrides");
        Ok(())
    }

    fn upsert_free_only(&self, date: NaiveDate, free: Worker) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            r#"
                INSERT INTO day_free (date, free) VALUES (?1, ?2)
                ON CONFLICT(date) DO UPDATE SET free = excluded.free
                "#,
            params![format_date(date), free.name()],
        )
        .context("Failed to upsert free worker")?;

        tracing::debug!(date = %date, free = %free, "Persisted free override");
        Ok(())
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory implementation of [`OverrideStore`]
#[derive(Default)]
pub struct MockOverrideStore {
    overrides: RwLock<Overrides>,
}

impl MockOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MockOverrideStore {
    fn load(&self) -> Result<Overrides> {
        Ok(self.overrides.read().map_err(poisoned)?.clone())
    }

    fn upsert_day(&self, date: NaiveDate, values: &DayChoices, free: Option<Worker>) -> Result<()> {
        let mut overrides = self.overrides.write().map_err(poisoned)?;
        for (shift, pair) in values.iter() {
            overrides.set_shift(
                date,
                shift,
                ShiftOverride {
                    occupant_a: Some(pair.a),
                    occupant_b: Some(pair.b),
                },
            );
        }
        if let Some(free) = free {
            overrides.set_free(date, free);
        }
        Ok(())
    }

    fn upsert_free_only(&self, date: NaiveDate, free: Worker) -> Result<()> {
        self.overrides.write().map_err(poisoned)?.set_free(date, free);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatPair;
    use crate::storage::Database;

    fn create_test_stores() -> Vec<Box<dyn OverrideStore>> {
        vec![
            Box::new(Database::in_memory().unwrap().overrides()),
            Box::new(MockOverrideStore::new()),
        ]
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    fn choices() -> DayChoices {
        DayChoices::new(
            SeatPair::new(Worker::Moira, Worker::Brisa),
            SeatPair {
                a: Occupant::NeedsCoverage,
                b: Occupant::Assigned(Worker::Dianela),
            },
            SeatPair::new(Worker::Hugo, Worker::Alina),
        )
    }

    #[test]
    fn test_empty_store() {
        for store in create_test_stores() {
            assert!(store.load().unwrap().is_empty());
        }
    }

    #[test]
    fn test_upsert_day_round_trip() {
        for store in create_test_stores() {
            store.upsert_day(date(), &choices(), Some(Worker::Jony)).unwrap();

            let loaded = store.load().unwrap();
            let afternoon = loaded.shift(date(), ShiftKind::Afternoon).unwrap();
            assert_eq!(afternoon.occupant_a, Some(Occupant::NeedsCoverage));
            assert_eq!(afternoon.occupant_b, Some(Occupant::Assigned(Worker::Dianela)));
            assert_eq!(loaded.free(date()), Some(Worker::Jony));
            assert_eq!(loaded.shifts.len(), 3);
        }
    }

    #[test]
    fn test_upsert_day_is_idempotent() {
        for store in create_test_stores() {
            store.upsert_day(date(), &choices(), Some(Worker::Jony)).unwrap();
            let once = store.load().unwrap();

            store.upsert_day(date(), &choices(), Some(Worker::Jony)).unwrap();
            let twice = store.load().unwrap();

            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_upsert_day_updates_in_place() {
        for store in create_test_stores() {
            store.upsert_day(date(), &choices(), None).unwrap();

            let mut changed = choices();
            changed.set(ShiftKind::Night, SeatPair::new(Worker::Jony, Worker::Hugo));
            store.upsert_day(date(), &changed, None).unwrap();

            let loaded = store.load().unwrap();
            assert_eq!(loaded.shifts.len(), 3);
            let night = loaded.shift(date(), ShiftKind::Night).unwrap();
            assert_eq!(night.occupant_a, Some(Occupant::Assigned(Worker::Jony)));
            assert_eq!(loaded.free(date()), None);
        }
    }

    #[test]
    fn test_free_only_leaves_seats_untouched() {
        for store in create_test_stores() {
            store.upsert_day(date(), &choices(), Some(Worker::Jere)).unwrap();
            store.upsert_free_only(date(), Worker::Brisa).unwrap();

            let loaded = store.load().unwrap();
            assert_eq!(loaded.free(date()), Some(Worker::Brisa));
            let morning = loaded.shift(date(), ShiftKind::Morning).unwrap();
            assert_eq!(morning.occupant_a, Some(Occupant::Assigned(Worker::Moira)));
        }
    }

    #[test]
    fn test_free_only_without_seat_rows() {
        for store in create_test_stores() {
            store.upsert_free_only(date(), Worker::Hugo).unwrap();

            let loaded = store.load().unwrap();
            assert_eq!(loaded.free(date()), Some(Worker::Hugo));
            assert!(loaded.shifts.is_empty());
        }
    }
}
