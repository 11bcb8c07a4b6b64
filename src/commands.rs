use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::config::{config_path, save_config, Config};
use crate::dedup::parse_due_date;
use crate::generator::{GenerationReport, ItemStatus};
use crate::listing::{TaskQuery, WeekendBoard};
use crate::models::{NewTask, Outcome, Task, TaskEdit, WeekendDay};
use crate::registrar::parse_day;
use crate::service::TaskService;
use crate::storage::{parse_definitions, FileStore};

pub type Service = TaskService<FileStore>;

/// Opens the store under the configured data directory.
pub fn open_service(cfg: &Config) -> Result<Service> {
    let store = FileStore::open(&cfg.data_dir)
        .with_context(|| format!("open data directory {}", cfg.data_dir.display()))?;
    Ok(TaskService::new(store, cfg.timezone()?))
}

fn header(cols: &[&str]) -> Vec<Cell> {
    cols.iter().map(|c| Cell::new(c).add_attribute(Attribute::Bold)).collect()
}

fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["ID", "Title", "Due", "Day", "Order", "Recurring", "Status"]));

    for t in tasks {
        let day = WeekendDay::of_date(t.due_date).map_or("-", WeekendDay::name);
        let (status, color) = if t.is_done { ("Done", Color::Green) } else { ("Open", Color::Yellow) };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title).fg(if t.is_done { Color::Grey } else { Color::Reset }),
            Cell::new(t.due_date),
            Cell::new(day),
            Cell::new(t.display_order),
            Cell::new(if t.is_recurring { "yes" } else { "" }),
            Cell::new(status).fg(color),
        ]);
    }
    table
}

fn print_board(board: &WeekendBoard) {
    for day in WeekendDay::ALL {
        let tasks = board.day(day);
        println!("{} {} ({} tasks)", day, board.weekend.date_for(day), tasks.len());
        if !tasks.is_empty() {
            println!("{}", task_table(tasks));
        }
    }
    if !board.midweek.is_empty() {
        println!("Midweek ({} tasks)", board.midweek.len());
        println!("{}", task_table(&board.midweek));
    }
}

/// Adds a task, defaulting the due date from the target weekend.
///
/// A new recurring task is also appended to the weekly list.
pub fn cmd_add(svc: &Service, title: String, due: Option<String>, recurring: bool, order: Option<i64>) -> Result<()> {
    let mut request = NewTask::undated(title).recurring(recurring);
    request.due_date = due.as_deref().map(parse_due_date).transpose()?;
    request.display_order = order;

    let submission = svc.submit(request, Utc::now())?;
    let t = &submission.task;
    match submission.outcome {
        Outcome::Created => println!("Task added (id = {}) for {}", t.id, t.due_date),
        Outcome::Duplicate => println!("Task '{}' already open for {} (id = {})", t.title, t.due_date, t.id),
    }
    if let Some(def) = &submission.definition {
        println!("Added to the weekly list: {} #{}", def.day_offset, def.order);
    }
    if let Some(warning) = &submission.warning {
        eprintln!("Warning: {warning}");
    }
    Ok(())
}

/// Lists tasks in a formatted table, open first.
pub fn cmd_list(svc: &Service, query: TaskQuery) -> Result<()> {
    let page = svc.list_tasks(&query)?;
    if page.tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", task_table(&page.tasks));
    println!(
        "Showing {}-{} of {}{}",
        page.offset + 1,
        page.offset + page.tasks.len(),
        page.total,
        if page.has_more { " (more with --offset)" } else { "" }
    );
    Ok(())
}

/// Shows the target weekend, one table per day.
pub fn cmd_weekend(svc: &Service) -> Result<()> {
    let board = svc.weekend_board(Utc::now())?;
    println!("Target weekend: {} to {}", board.weekend.friday, board.weekend.sunday);
    print_board(&board);
    Ok(())
}

/// Shows every task grouped by weekend, most recent first.
pub fn cmd_history(svc: &Service) -> Result<()> {
    let weeks = svc.history()?;
    if weeks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    for board in weeks {
        println!("== Weekend of {} ==", board.weekend.friday);
        print_board(&board);
    }
    Ok(())
}

/// Shows done tasks grouped by completion day.
pub fn cmd_completed(svc: &Service) -> Result<()> {
    let days = svc.completed_by_day()?;
    if days.is_empty() {
        println!("No completed tasks.");
        return Ok(());
    }
    for day in days {
        println!("{} ({} done)", day.date.format("%A %d %B %Y"), day.tasks.len());
        println!("{}", task_table(&day.tasks));
    }
    Ok(())
}

pub fn cmd_toggle(svc: &Service, id: u64) -> Result<()> {
    let t = svc.toggle_task(id, Utc::now())?;
    let status = if t.is_done { "completed" } else { "reopened" };
    println!("Task {} {}.", id, status);
    Ok(())
}

pub fn cmd_edit(svc: &Service, id: u64, title: Option<String>, due: Option<String>, order: Option<i64>) -> Result<()> {
    let edit = TaskEdit {
        title,
        due_date: due.as_deref().map(parse_due_date).transpose()?,
        display_order: order,
    };
    svc.edit_task(id, edit)?;
    println!("Task {} updated.", id);
    Ok(())
}

pub fn cmd_remove(svc: &Service, id: u64) -> Result<()> {
    let t = svc.remove_task(id)?;
    println!("Task {} ('{}') removed.", id, t.title);
    Ok(())
}

/// Deletes every task. The weekly list is kept.
pub fn cmd_clear(svc: &Service, dry_run: bool, force: bool) -> Result<()> {
    if dry_run {
        let count = svc.clear_tasks(true)?;
        println!("Dry run: {} tasks would be deleted.", count);
        return Ok(());
    }
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    let count = svc.clear_tasks(false)?;
    println!("{} tasks deleted.", count);
    Ok(())
}

pub fn cmd_definitions_list(svc: &Service) -> Result<()> {
    let defs = svc.list_definitions()?;
    if defs.is_empty() {
        println!("No recurring definitions.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header(&["Day", "Order", "Title"]));
    for d in defs {
        table.add_row(vec![Cell::new(d.day_offset), Cell::new(d.order), Cell::new(d.title)]);
    }
    println!("{table}");
    Ok(())
}

pub fn cmd_definitions_add(svc: &Service, title: String, day: String) -> Result<()> {
    let def = svc.register_definition(&title, parse_day(&day)?)?;
    println!("Definition added: {} #{} '{}'", def.day_offset, def.order, def.title);
    Ok(())
}

/// Appends the definitions of a JSONL file (same format as
/// `definitions.jsonl`), skipping titles already listed for their day.
pub fn cmd_definitions_import(svc: &Service, path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let incoming = parse_definitions(path, &raw)?;
    let summary = svc.import_definitions(&incoming)?;
    println!(
        "{} definitions added, {} already listed.",
        summary.added.len(),
        summary.skipped
    );
    Ok(())
}

fn print_report(report: &GenerationReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Due", "Day", "Order", "Title", "Result"]));
    for item in &report.results {
        let result = match item.status {
            ItemStatus::Created if report.simulated => Cell::new("would create").fg(Color::Cyan),
            ItemStatus::Created => Cell::new("created").fg(Color::Green),
            ItemStatus::Duplicate => Cell::new("exists").fg(Color::Grey),
            ItemStatus::Failed => Cell::new(format!("error: {}", item.error.as_deref().unwrap_or(""))).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(item.due_date),
            Cell::new(item.day),
            Cell::new(item.order),
            Cell::new(&item.title),
            result,
        ]);
    }
    println!("{table}");
}

/// Runs the weekly generation and returns the process exit code.
pub fn cmd_generate(svc: &Service, dry_run: bool, json: bool) -> Result<i32> {
    let report = svc.run_weekly_generation(Utc::now(), dry_run)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Target weekend: {} ({})",
            report.weekend.friday,
            if report.simulated { "simulation" } else { "production" }
        );
        if !report.results.is_empty() {
            print_report(&report);
        }
        println!(
            "{} created, {} already present, {} failed (of {})",
            report.created_count, report.duplicate_count, report.failed_count, report.total
        );
    }
    Ok(report.exit_code())
}

pub fn cmd_config_show(cfg: &Config) -> Result<()> {
    println!("# {}", config_path().display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}

pub fn cmd_config_init() -> Result<()> {
    let p = config_path();
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
