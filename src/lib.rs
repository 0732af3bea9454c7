//! turnero - Shift rotation and coverage tracking for a seven-person team
//!
//! Generates a rotating day-off schedule for three daily shifts, layers manual
//! changes and absences on top of it, and keeps a task list and a clock-in log.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Workers, shifts, seats and schedule entries
//! - [`scheduler`] - Rotation generator, override merge and absence reconciliation
//! - [`storage`] - SQLite repositories with in-memory mocks
//! - [`tasks`] - Shift task list
//! - [`timesheet`] - Clock-in / clock-out hour totals
//! - [`utils`] - Calendar helpers
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use turnero::models::{Occupant, ShiftKind, Worker};
//! use turnero::scheduler::generate;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let week = generate(monday, 7, 0);
//!
//! let morning = &week[0];
//! assert_eq!(morning.shift, ShiftKind::Morning);
//! assert_eq!(morning.free, Worker::Moira);
//! assert_eq!(morning.occupant_a, Occupant::Assigned(Worker::Alina));
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod tasks;
pub mod timesheet;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, RotationSettings};
    pub use crate::error::{Error, ErrorCategory, Result, TurneroErrorTrait};
    pub use crate::models::{
        AbsenceRecord, DayChoices, Occupant, ScheduleEntry, Seat, SeatPair, ShiftKind, Worker,
    };
    pub use crate::scheduler::{RotationGenerator, ScheduleService, SchedulerError};
    pub use crate::storage::Database;
}

// Direct re-exports for convenience
pub use models::{Occupant, ScheduleEntry, ShiftKind, Worker};
