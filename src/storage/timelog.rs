//! Clock-in / clock-out persistence

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;
use std::sync::RwLock;

use super::{format_date, format_timestamp, lock, parse_date, parse_timestamp, poisoned, SharedConnection};
use crate::models::{ShiftKind, Worker};
use crate::timesheet::{ClockEvent, ClockKind};

/// Repository for the time log
pub trait TimeLogRepository: Send + Sync {
    /// Append an event, returning its id
    fn record(&self, event: &ClockEvent) -> Result<i64>;

    /// Events dated between `from` and `to` inclusive, in timestamp order
    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ClockEvent>>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`TimeLogRepository`]
pub struct SqliteTimeLogRepository {
    conn: SharedConnection,
}

impl SqliteTimeLogRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

type RawEventRow = (i64, String, String, String, String, Option<String>, String);

impl TimeLogRepository for SqliteTimeLogRepository {
    fn record(&self, event: &ClockEvent) -> Result<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            r#"
                INSERT INTO time_log (date, worker, event_type, timestamp, shift, source)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            params![
                format_date(event.date),
                event.worker.name(),
                event.kind.as_str(),
                format_timestamp(event.timestamp),
                event.shift.map(|s| s.id()),
                event.source,
            ],
        )
        .context("Failed to record clock event")?;

        let id = conn.last_insert_rowid();
        tracing::info!(
            id,
            worker = %event.worker,
            kind = %event.kind,
            at = %event.timestamp,
            "Clock event recorded"
        );
        Ok(id)
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ClockEvent>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, worker, event_type, timestamp, shift, source
                 FROM time_log WHERE date >= ?1 AND date <= ?2
                 ORDER BY timestamp, id",
            )
            .context("Failed to prepare time log query")?;

        let rows: Vec<RawEventRow> = stmt
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
            .context("Failed to read time log")?;

        rows.into_iter()
            .map(|(id, date, worker, kind, timestamp, shift, source)| -> Result<ClockEvent> {
                let kind = kind
                    .parse::<ClockKind>()
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("Malformed event type in time_log")?;
                Ok(ClockEvent {
                    id: Some(id),
                    date: parse_date(&date)?,
                    worker: Worker::from_name(&worker).context("Malformed worker in time_log")?,
                    kind,
                    timestamp: parse_timestamp(&timestamp)?,
                    shift: shift
                        .map(|s| ShiftKind::from_id(&s))
                        .transpose()
                        .context("Malformed shift in time_log")?,
                    source,
                })
            })
            .collect()
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory implementation of [`TimeLogRepository`]
#[derive(Default)]
pub struct MockTimeLogRepository {
    events: RwLock<Vec<ClockEvent>>,
}

impl MockTimeLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeLogRepository for MockTimeLogRepository {
    fn record(&self, event: &ClockEvent) -> Result<i64> {
        let mut events = self.events.write().map_err(poisoned)?;
        let id = events.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
        let mut stored = event.clone();
        stored.id = Some(id);
        events.push(stored);
        Ok(id)
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ClockEvent>> {
        let events = self.events.read().map_err(poisoned)?;
        let mut found: Vec<ClockEvent> = events
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.timestamp, e.id));
        Ok(found)
    }
}

// ============================================================================
// Tests
// ============================================================================
