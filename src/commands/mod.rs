pub mod absence;
pub mod clock;
pub mod schedule;
pub mod tasks;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

use turnero::config::Config;
use turnero::scheduler::ScheduleService;
use turnero::storage::Database;
use turnero::utils::{month_range, parse_month};

// Re-export command functions for convenience
pub use absence::{absences, absent, assign};
pub use clock::{clock_in, clock_out, clock_summary};
pub use schedule::{free, hours, schedule};
pub use tasks::{task_add, task_delete, task_done, task_list};

/// Configuration plus the open database, shared by every command
pub struct App {
    pub config: Config,
    pub db: Database,
}

impl App {
    pub fn open(config: Config) -> Result<Self> {
        let db = Database::open(&config.database.sqlite_path)?;
        Ok(Self { config, db })
    }

    /// Coordinator over the stored overrides and absence log
    pub fn service(&self) -> Result<ScheduleService> {
        ScheduleService::new(
            self.config.rotation.clone(),
            Arc::new(self.db.overrides()),
            Arc::new(self.db.absences()),
        )
        .context("Failed to build schedule")
    }
}

/// Date range selection shared by listing commands
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Month (YYYY-MM); defaults to the current month
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,

    /// First date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD); defaults to the end of the month of `--from`
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    /// Resolve to an inclusive date range
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        if let Some(month) = &self.month {
            return parse_month(month);
        }

        let from = match self.from {
            Some(from) => from,
            None => month_start(today)?,
        };
        let to = match self.to {
            Some(to) => to,
            None => month_range(from.year(), from.month())
                .map(|(_, last)| last)
                .context("Invalid month")?,
        };

        if to < from {
            anyhow::bail!("--to ({to}) is before --from ({from})");
        }
        Ok((from, to))
    }

    pub fn resolve_today(&self) -> Result<(NaiveDate, NaiveDate)> {
        self.resolve(Local::now().date_naive())
    }
}

fn month_start(date: NaiveDate) -> Result<NaiveDate> {
    month_range(date.year(), date.month())
        .map(|(first, _)| first)
        .context("Invalid month")
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
