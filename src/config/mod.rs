//! Configuration management for turnero
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scheduler::{SchedulerError, SchedulerResult};
use crate::utils::{horizon_days, monday_of_week};

/// Largest accepted rotation offset
pub const MAX_OFFSET: u32 = 100;

/// Accepted horizon lengths in months
pub const HORIZON_MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rotation configuration
    pub rotation: RotationSettings,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Inputs of the baseline rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// First day of the generated range; moved back to its Monday
    pub anchor: NaiveDate,

    /// Months to generate (1-12)
    pub horizon_months: u32,

    /// Rotation offset in weeks (0-100, applied mod 7)
    pub offset: u32,

    /// Weekday on which the floater always rests
    #[serde(default)]
    pub floater_rest_weekday: Option<Weekday>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl RotationSettings {
    /// Settings anchored on the current week
    pub fn current_week() -> Self {
        Self {
            anchor: monday_of_week(Local::now().date_naive()),
            horizon_months: 6,
            offset: 0,
            floater_rest_weekday: None,
        }
    }

    /// Anchor moved back to the Monday of its week
    #[must_use]
    pub fn normalized_anchor(&self) -> NaiveDate {
        monday_of_week(self.anchor)
    }

    /// Number of generated days
    #[must_use]
    pub fn day_count(&self) -> usize {
        horizon_days(self.horizon_months)
    }

    /// Offset as used by the rotation formula
    #[must_use]
    pub fn effective_offset(&self) -> u32 {
        self.offset % 7
    }

    /// Check horizon and offset bounds
    pub fn validate(&self) -> SchedulerResult<()> {
        if !HORIZON_MONTHS.contains(&self.horizon_months) {
            return Err(SchedulerError::invalid_settings(
                "horizon_months",
                format!(
                    "must be between {} and {}, got {}",
                    HORIZON_MONTHS.start(),
                    HORIZON_MONTHS.end(),
                    self.horizon_months
                ),
            ));
        }

        if self.offset > MAX_OFFSET {
            return Err(SchedulerError::invalid_settings(
                "offset",
                format!("must be at most {MAX_OFFSET}, got {}", self.offset),
            ));
        }

        let back = Duration::days(i64::from(self.anchor.weekday().num_days_from_monday()));
        let span = Duration::days(self.day_count() as i64);
        let fits = self
            .anchor
            .checked_sub_signed(back)
            .and_then(|monday| monday.checked_add_signed(span))
            .is_some();
        if !fits {
            return Err(SchedulerError::invalid_settings(
                "anchor",
                format!("{} leaves no room for {} days", self.anchor, self.day_count()),
            ));
        }

        Ok(())
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self::current_week()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = RotationSettings::current_week();

        let anchor = match std::env::var("TURNERO_ANCHOR") {
            Ok(raw) => crate::utils::parse_date(&raw).context("Invalid TURNERO_ANCHOR")?,
            Err(_) => defaults.anchor,
        };

        let horizon_months = std::env::var("TURNERO_HORIZON_MONTHS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.horizon_months);

        let offset = std::env::var("TURNERO_OFFSET")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.offset);

        let floater_rest_weekday = match std::env::var("TURNERO_FLOATER_REST") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Invalid TURNERO_FLOATER_REST: '{raw}'"))?,
            ),
            _ => None,
        };

        let sqlite_path = std::env::var("TURNERO_DB_PATH")
            .unwrap_or_else(|_| String::from("data/turnero.db"))
            .into();

        let log_level = std::env::var("TURNERO_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("TURNERO_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            rotation: RotationSettings {
                anchor,
                horizon_months,
                offset,
                floater_rest_weekday,
            },
            database: DatabaseConfig { sqlite_path },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.rotation.validate()?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json', got '{}'", self.logging.format);
        }

        if self.database.sqlite_path.as_os_str().is_empty() {
            anyhow::bail!("sqlite_path must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rotation: RotationSettings::default(),
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/turnero.db"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
