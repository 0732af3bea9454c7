//! Unified error handling for the turnero crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`TurneroErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use turnero::error::{Error, TurneroErrorTrait};
//!
//! fn report(err: Error) {
//!     if err.is_recoverable() {
//!         eprintln!("{}", err.localized_desc());
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::scheduler::error::SchedulerError;
pub use crate::tasks::TaskError;

/// Common trait for all turnero error types
pub trait TurneroErrorTrait: std::error::Error {
    /// Check if the user can correct the input and try again
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected user input (unknown names, empty titles)
    Validation,
    /// Storage and I/O errors
    Storage,
    /// Configuration errors
    Config,
    /// Rotation and reconciliation errors
    Scheduler,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Validation => crate::i18n::t!("errors.category.validation").to_string(),
            Self::Storage => crate::i18n::t!("errors.category.storage").to_string(),
            Self::Config => crate::i18n::t!("errors.category.config").to_string(),
            Self::Scheduler => crate::i18n::t!("errors.category.scheduler").to_string(),
            Self::Other => crate::i18n::t!("errors.category.other").to_string(),
        }
    }
}

/// Unified error type for the turnero crate
#[derive(Error, Debug)]
pub enum Error {
    /// Rotation, lookup and reconciliation errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Task list errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Repository failures, carrying their context chain
    #[error("Storage error: {0:#}")]
    Storage(#[source] anyhow::Error),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TurneroErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Task(_) => true,
            Self::Storage(_) | Self::Database(_) => false,
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Scheduler(e) => e.localized_desc(),
            Self::Task(e) => match e {
                TaskError::EmptyTitle => crate::i18n::t!("errors.task.empty_title").to_string(),
                TaskError::NotFound(id) => {
                    crate::i18n::t!("errors.task.not_found", id = id).to_string()
                }
                TaskError::InvalidStatus(status) => {
                    crate::i18n::t!("errors.task.invalid_status", status = status).to_string()
                }
            },
            Self::Storage(e) => format!("{}: {e:#}", crate::i18n::t!("errors.storage.error")),
            Self::Database(e) => format!("{}: {e}", crate::i18n::t!("errors.database.error")),
            Self::Io(e) => format!("{}: {e}", crate::i18n::t!("errors.io.error")),
            Self::Json(e) => format!("{}: {e}", crate::i18n::t!("errors.json.error")),
            Self::Config(msg) => format!("{}: {msg}", crate::i18n::t!("errors.config.error")),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(e) => match e {
                SchedulerError::InvalidWorker { .. }
                | SchedulerError::InvalidShift { .. }
                | SchedulerError::InvalidSeat { .. }
                | SchedulerError::DuplicateOccupant { .. } => ErrorCategory::Validation,
                SchedulerError::InvalidSettings { .. } => ErrorCategory::Config,
                SchedulerError::InvalidOccupant { .. } | SchedulerError::EntryNotFound { .. } => {
                    ErrorCategory::Scheduler
                }
            },
            Self::Task(_) => ErrorCategory::Validation,
            Self::Storage(_) | Self::Database(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from rusqlite::Error
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err)
    }
}

// Repository errors arrive as anyhow chains; domain errors inside are unwrapped
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<SchedulerError>() {
            Ok(e) => Self::Scheduler(e),
            Err(err) => Self::Storage(err),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
