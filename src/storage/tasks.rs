//! Task list persistence

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use std::sync::RwLock;

use super::{format_date, format_timestamp, lock, parse_date, parse_timestamp, poisoned, SharedConnection};
use crate::models::{ShiftKind, Worker};
use crate::tasks::{NewTask, Task, TaskStatus};
use crate::utils::local_now;

/// Repository for shift tasks
pub trait TaskRepository: Send + Sync {
    /// Store a new pending task
    fn add(&self, task: NewTask) -> Result<Task>;

    /// Get task by id
    fn get(&self, id: i64) -> Result<Option<Task>>;

    /// Tasks dated between `from` and `to` inclusive, in listing order
    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>>;

    /// Mark a task done; `false` if it does not exist
    fn mark_done(&self, id: i64) -> Result<bool>;

    /// Delete a task; `false` if it does not exist
    fn delete(&self, id: i64) -> Result<bool>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`TaskRepository`]
pub struct SqliteTaskRepository {
    conn: SharedConnection,
}

impl SqliteTaskRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

type RawTaskRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
);

const TASK_COLUMNS: &str = "id, date, shift, worker, title, status, due, created_at";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTaskRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_row(raw: RawTaskRow) -> Result<Task> {
    let (id, date, shift, worker, title, status, due, created_at) = raw;
    Ok(Task {
        id,
        date: parse_date(&date)?,
        shift: shift
            .filter(|s| !s.is_empty())
            .map(|s| ShiftKind::from_id(&s))
            .transpose()
            .context("Malformed shift in tasks")?,
        worker: worker
            .filter(|w| !w.is_empty())
            .map(|w| Worker::from_name(&w))
            .transpose()
            .context("Malformed worker in tasks")?,
        title,
        status: status.parse::<TaskStatus>().context("Malformed status in tasks")?,
        due: due.map(|d| parse_date(&d)).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

impl TaskRepository for SqliteTaskRepository {
    fn add(&self, task: NewTask) -> Result<Task> {
        let conn = lock(&self.conn)?;
        let created_at = local_now();

        conn.execute(
            r#"
                INSERT INTO tasks (date, shift, worker, title, status, due, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            params![
                format_date(task.date),
                task.shift.map(|s| s.id()),
                task.worker.map(|w| w.name()),
                task.title,
                TaskStatus::Pending.as_str(),
                task.due.map(format_date),
                format_timestamp(created_at),
            ],
        )
        .context("Failed to insert task")?;

        let id = conn.last_insert_rowid();
        tracing::info!(id, title = %task.title, "Task added");
        Ok(task.into_task(id, created_at))
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        let conn = lock(&self.conn)?;
        let raw = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()
            .context("Failed to get task")?;

        raw.map(parse_row).transpose()
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE date >= ?1 AND date <= ?2"
            ))
            .context("Failed to prepare task query")?;

        let rows: Vec<RawTaskRow> = stmt
            .query_map(params![format_date(from), format_date(to)], read_row)?
            .collect::<rusqlite::Result<_>>()
            .context("Failed to read tasks")?;

        let mut tasks = rows.into_iter().map(parse_row).collect::<Result<Vec<_>>>()?;
        tasks.sort_by_key(Task::listing_key);
        Ok(tasks)
    }

    fn mark_done(&self, id: i64) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let updated = conn
            .execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                params![TaskStatus::Done.as_str(), id],
            )
            .context("Failed to update task")?;
        Ok(updated > 0)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let deleted = conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .context("Failed to delete task")?;
        Ok(deleted > 0)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory implementation of [`TaskRepository`]
#[derive(Default)]
pub struct MockTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for MockTaskRepository {
    fn add(&self, task: NewTask) -> Result<Task> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = task.into_task(id, local_now());
        tasks.push(task.clone());
        Ok(task)
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    fn list_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        let mut found: Vec<Task> = tasks
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(Task::listing_key);
        Ok(found)
    }

    fn mark_done(&self, id: i64) -> Result<bool> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = TaskStatus::Done;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }
}

// ============================================================================
// Tests
// ============================================================================
