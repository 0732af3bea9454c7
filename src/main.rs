use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnero::config::Config;
use turnero::error::TurneroErrorTrait;
use turnero::models::{Occupant, Seat, ShiftKind, Worker};

mod commands;

use commands::{App, RangeArgs};

#[derive(Parser)]
#[command(
    name = "turnero",
    version,
    about = "Rotating shift schedule with absence tracking, tasks and a clock-in log",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json), overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective schedule
    Schedule {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show who is free on a date
    Free {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Mark the occupant of a seat absent and save the day
    Absent {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,

        /// Shift (morning, afternoon, night)
        shift: ShiftKind,

        /// Seat (A or B)
        seat: Seat,
    },

    /// Put a worker (or needs-coverage) in a seat and save the day
    Assign {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,

        /// Shift (morning, afternoon, night)
        shift: ShiftKind,

        /// Seat (A or B)
        seat: Seat,

        /// Worker name or NEEDS_COVERAGE
        occupant: Occupant,
    },

    /// List logged absences
    Absences {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Scheduled hours per worker
    Hours {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage the task list
    #[command(subcommand)]
    Task(TaskCommand),

    /// Clock in, clock out and clocked hours
    #[command(subcommand)]
    Clock(ClockCommand),
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Add a task
    Add {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,

        /// Task title
        title: String,

        /// Shift the task belongs to
        #[arg(long)]
        shift: Option<ShiftKind>,

        /// Worker responsible
        #[arg(long)]
        worker: Option<Worker>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Mark a task done
    Done {
        /// Task id
        id: i64,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: i64,
    },
}

#[derive(Subcommand)]
enum ClockCommand {
    /// Record a clock-in
    In {
        worker: Worker,

        /// Timestamp (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<NaiveDateTime>,

        /// Shift being worked
        #[arg(long)]
        shift: Option<ShiftKind>,
    },

    /// Record a clock-out
    Out {
        worker: Worker,

        /// Timestamp (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<NaiveDateTime>,

        /// Shift being worked
        #[arg(long)]
        shift: Option<ShiftKind>,
    },

    /// Clocked hours per worker
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    turnero::i18n::init_from_env();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(db) = &cli.db {
        config.database.sqlite_path = db.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    config.validate().context("Invalid configuration")?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    tracing::debug!(
        anchor = %config.rotation.anchor,
        horizon_months = config.rotation.horizon_months,
        offset = config.rotation.offset,
        db = %config.database.sqlite_path.display(),
        "Configuration loaded"
    );

    let app = App::open(config)?;

    let outcome = match cli.command {
        Commands::Schedule { range, json } => commands::schedule(&app, &range, json),
        Commands::Free { date } => commands::free(&app, date),
        Commands::Absent { date, shift, seat } => commands::absent(&app, date, shift, seat),
        Commands::Assign {
            date,
            shift,
            seat,
            occupant,
        } => commands::assign(&app, date, shift, seat, occupant),
        Commands::Absences { range, json } => commands::absences(&app, &range, json),
        Commands::Hours { range, json } => commands::hours(&app, &range, json),
        Commands::Task(command) => match command {
            TaskCommand::Add {
                date,
                title,
                shift,
                worker,
                due,
            } => commands::task_add(&app, date, &title, shift, worker, due),
            TaskCommand::List { range, json } => commands::task_list(&app, &range, json),
            TaskCommand::Done { id } => commands::task_done(&app, id),
            TaskCommand::Delete { id } => commands::task_delete(&app, id),
        },
        Commands::Clock(command) => match command {
            ClockCommand::In { worker, at, shift } => {
                commands::clock_in(&app, worker, at, shift)
            }
            ClockCommand::Out { worker, at, shift } => {
                commands::clock_out(&app, worker, at, shift)
            }
            ClockCommand::Summary { range, json } => commands::clock_summary(&app, &range, json),
        },
    };

    if let Err(err) = &outcome {
        if let Some(domain) = err.downcast_ref::<turnero::error::Error>() {
            tracing::error!(
                category = ?domain.category(),
                recoverable = domain.is_recoverable(),
                "{}",
                domain.localized_desc()
            );
        }
    }
    outcome
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("turnero=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("turnero={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
