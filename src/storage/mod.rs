//! Durable storage for overrides, absences, tasks and the time log
//!
//! Everything lives in one SQLite database. [`Database`] owns the connection and
//! hands out repository handles that share it; each repository also has an
//! in-memory mock for tests.

pub mod absences;
pub mod overrides;
pub mod tasks;
pub mod timelog;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub use absences::{AbsenceLog, MockAbsenceLog, SharedAbsenceLog, SqliteAbsenceLog};
pub use overrides::{MockOverrideStore, OverrideStore, SharedOverrideStore, SqliteOverrideStore};
pub use tasks::{MockTaskRepository, SqliteTaskRepository, TaskRepository};
pub use timelog::{MockTimeLogRepository, SqliteTimeLogRepository, TimeLogRepository};

/// Date format used for every persisted date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used for every persisted timestamp (seconds precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Connection shared by the SQLite repositories
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Database management wrapper
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    /// Open (or create) the database file and its schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self::from_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite database initialized");
        Ok(db)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn overrides(&self) -> SqliteOverrideStore {
        SqliteOverrideStore::new(Arc::clone(&self.conn))
    }

    pub fn absences(&self) -> SqliteAbsenceLog {
        SqliteAbsenceLog::new(Arc::clone(&self.conn))
    }

    pub fn tasks(&self) -> SqliteTaskRepository {
        SqliteTaskRepository::new(Arc::clone(&self.conn))
    }

    pub fn time_log(&self) -> SqliteTimeLogRepository {
        SqliteTimeLogRepository::new(Arc::clone(&self.conn))
    }
}

/// Create database schema
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
            CREATE TABLE IF NOT EXISTS shift_overrides (
                date TEXT NOT NULL,
                shift TEXT NOT NULL,
                occupant_a TEXT,
                occupant_b TEXT,
                PRIMARY KEY (date, shift)
            );

            CREATE TABLE IF NOT EXISTS day_free (
                date TEXT PRIMARY KEY,
                free TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS absences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                shift TEXT NOT NULL,
                seat TEXT NOT NULL,
                worker TEXT NOT NULL,
                reason TEXT NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_absences_date
                ON absences(date);

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                shift TEXT,
                worker TEXT,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                due TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_date
                ON tasks(date);

            CREATE TABLE IF NOT EXISTS time_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                worker TEXT NOT NULL,
                event_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                shift TEXT,
                source TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_time_log_date
                ON time_log(date);
            "#,
    )
    .context("Failed to create SQLite schema")?;

    Ok(())
}

// ============================================================================
// Row helpers
// ============================================================================

pub(crate) fn lock(conn: &SharedConnection) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(poisoned)
}

/// Map a poisoned lock into a storage error
pub(crate) fn poisoned<E>(_: E) -> anyhow::Error {
    anyhow!("storage lock poisoned")
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Malformed date in storage: '{raw}'"))
}

pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .with_context(|| format!("Malformed timestamp in storage: '{raw}'"))
}
