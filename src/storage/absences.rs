//! Absence log

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use super::{format_date, format_timestamp, lock, parse_date, parse_timestamp, poisoned, SharedConnection};
use crate::models::{AbsenceRecord, Seat, ShiftKind, Worker};

/// Append-only log of absences, with retraction
pub trait AbsenceLog: Send + Sync {
    /// Append a record, returning its id
    fn append(&self, record: &AbsenceRecord) -> Result<i64>;

    /// Records between `from` and `to` inclusive, sorted by date, shift, seat
    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AbsenceRecord>>;

    /// Records of a single day
    fn for_date(&self, date: NaiveDate) -> Result<Vec<AbsenceRecord>> {
        self.list_range(date, date)
    }

    /// Delete every record on `date` whose worker is in `present`
    ///
    /// Returns the number of records removed.
    fn remove_present(&self, date: NaiveDate, present: &BTreeSet<Worker>) -> Result<usize>;
}

/// Thread-safe shared absence log
pub type SharedAbsenceLog = Arc<dyn AbsenceLog>;

fn sort_records(records: &mut [AbsenceRecord]) {
    records.sort_by(|a, b| {
        (a.date, a.shift, a.seat, a.id).cmp(&(b.date, b.shift, b.seat, b.id))
    });
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`AbsenceLog`]
pub struct SqliteAbsenceLog {
    conn: SharedConnection,
}

impl SqliteAbsenceLog {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

type RawAbsenceRow = (i64, String, String, String, String, String, String);

impl AbsenceLog for SqliteAbsenceLog {
    fn append(&self, record: &AbsenceRecord) -> Result<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            r#"
                INSERT INTO absences (date, shift, seat, worker, reason, logged_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            params![
                format_date(record.date),
                record.shift.id(),
                record.seat.id(),
                record.worker.name(),
                record.reason,
                format_timestamp(record.logged_at),
            ],
        )
        .context("Failed to append absence")?;

        let id = conn.last_insert_rowid();
        tracing::info!(
            id,
            date = %record.date,
            shift = %record.shift,
            seat = %record.seat,
            worker = %record.worker,
            "Absence logged"
        );
        Ok(id)
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AbsenceRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, shift, seat, worker, reason, logged_at
                 FROM absences WHERE date >= ?1 AND date <= ?2",
            )
            .context("Failed to prepare absence query")?;

        let rows: Vec<RawAbsenceRow> = stmt
            .query_map(params![format_date(from), format_date(to)], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()
            .context("Failed to read absences")?;

        let mut records = rows
            .into_iter()
            .map(|(id, date, shift, seat, worker, reason, logged_at)| -> Result<AbsenceRecord> {
                Ok(AbsenceRecord {
                    id: Some(id),
                    date: parse_date(&date)?,
                    shift: ShiftKind::from_id(&shift).context("Malformed shift in absences")?,
                    seat: seat.parse::<Seat>().context("Malformed seat in absences")?,
                    worker: Worker::from_name(&worker).context("Malformed worker in absences")?,
                    reason,
                    logged_at: parse_timestamp(&logged_at)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        sort_records(&mut records);
        Ok(records)
    }

    fn remove_present(&self, date: NaiveDate, present: &BTreeSet<Worker>) -> Result<usize> {
        if present.is_empty() {
            return Ok(0);
        }

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction().context("Failed to begin transaction")?;
        let day = format_date(date);
        let mut removed = 0;

        for worker in present {
            removed += tx
                .execute(
                    "DELETE FROM absences WHERE date = ?1 AND worker = ?2",
                    params![day, worker.name()],
                )
                .context("Failed to retract absence")?;
        }

        tx.commit().context("Failed to commit absence retraction")?;

        if removed > 0 {
            tracing::info!(date = %day, removed, "Retracted absences of workers present");
        }
        Ok(removed)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory implementation of [`AbsenceLog`]
#[derive(Default)]
pub struct MockAbsenceLog {
    records: RwLock<Vec<AbsenceRecord>>,
}

impl MockAbsenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AbsenceLog for MockAbsenceLog {
    fn append(&self, record: &AbsenceRecord) -> Result<i64> {
        let mut records = self.records.write().map_err(poisoned)?;
        let id = records.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
        let mut stored = record.clone();
        stored.id = Some(id);
        records.push(stored);
        Ok(id)
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AbsenceRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        let mut found: Vec<_> = records
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect();
        sort_records(&mut found);
        Ok(found)
    }

    fn remove_present(&self, date: NaiveDate, present: &BTreeSet<Worker>) -> Result<usize> {
        let mut records = self.records.write().map_err(poisoned)?;
        let before = records.len();
        records.retain(|r| !(r.date == date && present.contains(&r.worker)));
        Ok(before - records.len())
    }
}

// ============================================================================
// Tests
// ============================================================================
