use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, parse_opt};
use crate::dossier::{get_vehicle, replace_tasks, update_task};
use crate::error::{DossierError, Result};
use crate::models::{Priority, TaskRecord, TaskStatus};
use crate::tasks::regenerate;

fn status_cell(status: TaskStatus) -> String {
    match status {
        TaskStatus::Open => status.as_str().yellow().to_string(),
        TaskStatus::InProgress => status.as_str().cyan().to_string(),
        TaskStatus::Done => status.as_str().green().to_string(),
    }
}

fn priority_cell(priority: Priority) -> String {
    match priority {
        Priority::High => priority.as_str().red().bold().to_string(),
        _ => priority.as_str().to_string(),
    }
}

pub(crate) fn print_tasks(tasks: &[TaskRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Task", "Priority", "Status", "Category"]);
    for t in tasks {
        table.add_row(vec![
            Cell::new(&t.key),
            Cell::new(format!("{}\n{}", t.name, t.description.dimmed())),
            Cell::new(priority_cell(t.priority)),
            Cell::new(status_cell(t.status)),
            Cell::new(&t.category),
        ]);
    }
    println!("Tasks\n{table}");
}

pub fn generate(id: i64, force: bool) -> Result<()> {
    let mut conn = open_db()?;
    let mut vehicle = get_vehicle(&conn, id)?;
    if !vehicle.tasks.is_empty() && !force {
        return Err(DossierError::Other(format!(
            "Vehicle {id} already has {} tasks. Use --force to regenerate (status changes are lost).",
            vehicle.tasks.len()
        )));
    }

    regenerate(&mut vehicle);
    replace_tasks(&mut conn, id, &vehicle.tasks)?;
    println!("Generated {} tasks for vehicle {id}.", vehicle.tasks.len());
    print_tasks(&vehicle.tasks);
    Ok(())
}

pub fn list(id: i64) -> Result<()> {
    let conn = open_db()?;
    let vehicle = get_vehicle(&conn, id)?;
    if vehicle.tasks.is_empty() {
        println!("No tasks yet. Run `dossier tasks generate {id}`.");
        return Ok(());
    }
    print_tasks(&vehicle.tasks);
    Ok(())
}

pub fn set(id: i64, key: &str, status: Option<&str>, priority: Option<&str>) -> Result<()> {
    let status: Option<TaskStatus> = parse_opt(status)?;
    let priority: Option<Priority> = parse_opt(priority)?;
    if status.is_none() && priority.is_none() {
        return Err(DossierError::InvalidValue(
            "pass --status and/or --priority".to_string(),
        ));
    }
    let conn = open_db()?;
    let task = update_task(&conn, id, key, status, priority)?;
    println!(
        "{}: status {}, priority {}",
        task.name, task.status, task.priority
    );
    Ok(())
}
