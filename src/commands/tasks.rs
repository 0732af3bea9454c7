use anyhow::Result;
use chrono::NaiveDate;

use turnero::error::Error;
use turnero::models::{ShiftKind, Worker};
use turnero::storage::TaskRepository;
use turnero::tasks::{NewTask, TaskError};

use super::{print_json, App, RangeArgs};

pub fn task_add(
    app: &App,
    date: NaiveDate,
    title: &str,
    shift: Option<ShiftKind>,
    worker: Option<Worker>,
    due: Option<NaiveDate>,
) -> Result<()> {
    let task = NewTask::new(date, title)
        .map_err(Error::from)?
        .with_shift(shift)
        .with_worker(worker)
        .with_due(due);

    let task = app.db.tasks().add(task)?;
    println!("Added task {}: {}", task.id, task.title);
    Ok(())
}

pub fn task_list(app: &App, range: &RangeArgs, json: bool) -> Result<()> {
    let (from, to) = range.resolve_today()?;
    let tasks = app.db.tasks().list_range(from, to)?;

    if json {
        return print_json(&tasks);
    }

    if tasks.is_empty() {
        println!("No tasks between {from} and {to}");
        return Ok(());
    }

    for task in &tasks {
        let mark = if task.is_done() { "x" } else { " " };
        let shift = task.shift.map(|s| s.spanish_label()).unwrap_or("-");
        let worker = task.worker.map(|w| w.name()).unwrap_or("-");
        let due = task
            .due
            .map(|d| format!("  due {d}"))
            .unwrap_or_default();
        println!(
            "[{mark}] {:>4}  {}  {:<7} {:<8} {}{due}",
            task.id, task.date, shift, worker, task.title
        );
    }
    Ok(())
}

pub fn task_done(app: &App, id: i64) -> Result<()> {
    if !app.db.tasks().mark_done(id)? {
        return Err(Error::from(TaskError::NotFound(id)).into());
    }
    println!("Task {id} done");
    Ok(())
}

pub fn task_delete(app: &App, id: i64) -> Result<()> {
    if !app.db.tasks().delete(id)? {
        return Err(Error::from(TaskError::NotFound(id)).into());
    }
    println!("Task {id} deleted");
    Ok(())
}
