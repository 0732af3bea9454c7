//! Error types for the scheduler module

use chrono::NaiveDate;
use std::fmt;

use crate::models::{ShiftKind, Worker};

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Unknown worker name
    InvalidWorker {
        name: String,
        valid_options: Vec<String>,
    },

    /// Unknown shift name
    InvalidShift {
        name: String,
    },

    /// Unknown seat (must be A or B)
    InvalidSeat {
        name: String,
    },

    /// Persisted or typed occupant value that is neither a worker nor the
    /// needs-coverage marker
    InvalidOccupant {
        token: String,
    },

    /// No schedule row for the requested date (and shift)
    EntryNotFound {
        date: NaiveDate,
        shift: Option<ShiftKind>,
    },

    /// The same worker was placed in both seats of one shift
    DuplicateOccupant {
        date: NaiveDate,
        shift: ShiftKind,
        worker: Worker,
    },

    /// Rotation settings outside their allowed range
    InvalidSettings {
        field: String,
        reason: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWorker {
                name,
                valid_options,
            } => {
                write!(
                    f,
                    "Invalid worker '{}'. Valid options: {}",
                    name,
                    valid_options.join(", ")
                )
            }
            Self::InvalidShift { name } => {
                write!(f, "Invalid shift '{}'. Must be morning, afternoon or night", name)
            }
            Self::InvalidSeat { name } => {
                write!(f, "Invalid seat '{}'. Must be A or B", name)
            }
            Self::InvalidOccupant { token } => {
                write!(f, "Invalid occupant value: '{}'", token)
            }
            Self::EntryNotFound { date, shift } => match shift {
                Some(shift) => write!(f, "No schedule entry for {} {}", date, shift),
                None => write!(f, "No schedule entries for {}", date),
            },
            Self::DuplicateOccupant {
                date,
                shift,
                worker,
            } => {
                write!(
                    f,
                    "{} is assigned to both seats of the {} shift on {}",
                    worker, shift, date
                )
            }
            Self::InvalidSettings { field, reason } => {
                write!(f, "Invalid rotation setting '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Create an invalid worker error
    pub fn invalid_worker(name: impl Into<String>) -> Self {
        Self::InvalidWorker {
            name: name.into(),
            valid_options: Worker::all().iter().map(|w| w.name().to_string()).collect(),
        }
    }

    /// Create an entry-not-found error for a whole day
    pub fn day_not_found(date: NaiveDate) -> Self {
        Self::EntryNotFound { date, shift: None }
    }

    /// Create an entry-not-found error for one shift
    pub fn entry_not_found(date: NaiveDate, shift: ShiftKind) -> Self {
        Self::EntryNotFound {
            date,
            shift: Some(shift),
        }
    }

    /// Create an invalid settings error
    pub fn invalid_settings(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get localized description for the error
    pub fn localized_desc(&self) -> String {
        match self {
            Self::InvalidWorker { name, .. } => {
                crate::i18n::t!("errors.scheduler.invalid_worker", name = name).to_string()
            }
            Self::InvalidShift { name } => {
                crate::i18n::t!("errors.scheduler.invalid_shift", name = name).to_string()
            }
            Self::InvalidSeat { name } => {
                crate::i18n::t!("errors.scheduler.invalid_seat", name = name).to_string()
            }
            Self::InvalidOccupant { token } => {
                crate::i18n::t!("errors.scheduler.invalid_occupant", token = token).to_string()
            }
            Self::EntryNotFound { date, .. } => {
                crate::i18n::t!("errors.scheduler.entry_not_found", date = date.to_string())
                    .to_string()
            }
            Self::DuplicateOccupant { worker, shift, .. } => crate::i18n::t!(
                "errors.scheduler.duplicate_occupant",
                worker = worker.name(),
                shift = shift.id()
            )
            .to_string(),
            Self::InvalidSettings { field, reason } => crate::i18n::t!(
                "errors.scheduler.invalid_settings",
                field = field,
                reason = reason
            )
            .to_string(),
        }
    }

    /// Check if the operator can correct the input and retry in the same session
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidOccupant { .. } | Self::InvalidSettings { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_worker_error() {
        let err = SchedulerError::invalid_worker("Lucy");
        assert!(err.to_string().contains("Lucy"));
        assert!(err.to_string().contains("Moira"));
    }

    #[test]
    fn test_entry_not_found_display() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = SchedulerError::entry_not_found(date, ShiftKind::Night);
        assert_eq!(err.to_string(), "No schedule entry for 2024-01-01 night");

        let err = SchedulerError::day_not_found(date);
        assert_eq!(err.to_string(), "No schedule entries for 2024-01-01");
    }

    #[test]
    fn test_is_recoverable() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(SchedulerError::day_not_found(date).is_recoverable());

        let corrupt = SchedulerError::InvalidOccupant {
            token: "???".to_string(),
        };
        assert!(!corrupt.is_recoverable());
    }
}
