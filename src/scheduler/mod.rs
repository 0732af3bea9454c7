//! Shift rotation and override reconciliation
//!
//! # Overview
//!
//! Seven workers cover three daily shifts with two seats each. Every day one
//! worker is off; the floater (Alina) takes the seat of whichever regular is
//! off. On top of that generated baseline, manual changes are stored as sparse
//! overrides and layered back on every read, so regenerating the baseline never
//! loses them.
//!
//! # Architecture
//!
//! ```text
//!   RotationSettings ──► RotationGenerator ──► baseline
//!                                                 │
//!   OverrideStore ──────────► merge ◄─────────────┘
//!        ▲                      │
//!        │                      ▼
//!   ScheduleService ◄──── effective schedule ───► CLI
//!     (Session, PendingChanges, AbsenceLog)
//! ```
//!
//! # Modules
//!
//! - [`rotation`] - Day-off rotation and seat cover rules
//! - [`merge`] - Left join of baseline and overrides
//! - [`reconcile`] - Absence staging, free reassignment and the editing session
//! - [`service`] - Coordinator owning baseline, effective view and session
//! - [`hours`] - Scheduled hours per worker
//! - [`error`] - Scheduler error types
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use turnero::config::RotationSettings;
//! use turnero::models::{Seat, ShiftKind};
//! use turnero::scheduler::ScheduleService;
//! use turnero::storage::Database;
//!
//! # fn main() -> turnero::error::Result<()> {
//! let db = Database::open("data/turnero.db")?;
//! let settings = RotationSettings {
//!     anchor: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     horizon_months: 6,
//!     offset: 0,
//!     floater_rest_weekday: None,
//! };
//! let mut service = ScheduleService::new(
//!     settings,
//!     Arc::new(db.overrides()),
//!     Arc::new(db.absences()),
//! )?;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
//! service.stage_absence(day, ShiftKind::Night, Seat::A)?;
//! service.apply_pending()?;
//! println!("Free on {day}: {}", service.free_worker(day)?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hours;
pub mod merge;
pub mod reconcile;
pub mod rotation;
pub mod service;

pub use error::{SchedulerError, SchedulerResult};
pub use hours::HoursSummary;
pub use merge::{merge, Overrides, ShiftOverride};
pub use reconcile::{AbsencePlan, PendingChanges, SeatKey, SeatState, Session};
pub use rotation::{cover, generate, RotationGenerator, ROTATION_ORDER};
pub use service::{CommitReport, ScheduleService};
