//! Shift task list
//!
//! Plain to-do records optionally tied to a shift and a worker.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{ShiftKind, Worker};

/// Task-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Task {0} not found")]
    NotFound(i64),

    #[error("Unknown task status: {0}")]
    InvalidStatus(String),
}

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendiente" => Ok(Self::Pending),
            "done" | "hecho" => Ok(Self::Done),
            other => Err(TaskError::InvalidStatus(other.to_string())),
        }
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub date: NaiveDate,
    pub shift: Option<ShiftKind>,
    pub worker: Option<Worker>,
    pub title: String,
    pub status: TaskStatus,
    pub due: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Ordering used by task listings: date, shift, worker, status, id
    pub fn listing_key(&self) -> (NaiveDate, Option<ShiftKind>, Option<Worker>, TaskStatus, i64) {
        (self.date, self.shift, self.worker, self.status, self.id)
    }
}

/// A task about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub date: NaiveDate,
    pub shift: Option<ShiftKind>,
    pub worker: Option<Worker>,
    pub title: String,
    pub due: Option<NaiveDate>,
}

impl NewTask {
    /// Create a task with a trimmed, non-empty title
    pub fn new(date: NaiveDate, title: &str) -> Result<Self, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Self {
            date,
            shift: None,
            worker: None,
            title: title.to_string(),
            due: None,
        })
    }

    pub fn with_shift(mut self, shift: Option<ShiftKind>) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_worker(mut self, worker: Option<Worker>) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_due(mut self, due: Option<NaiveDate>) -> Self {
        self.due = due;
        self
    }

    /// Materialize with an id and creation time
    pub fn into_task(self, id: i64, created_at: NaiveDateTime) -> Task {
        Task {
            id,
            date: self.date,
            shift: self.shift,
            worker: self.worker,
            title: self.title,
            status: TaskStatus::Pending,
            due: self.due,
            created_at,
        }
    }
}
