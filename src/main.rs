//! # hoteltask
//!
//! Weekend checklist for a small hotel. Tasks belong to a service day of the
//! Friday-Saturday-Sunday window; a recurring task goes into the weekly list
//! and is recreated for every following weekend by `hoteltask generate`
//! (typically run from cron on Friday morning).
//!
//! ## Target weekend
//!
//! From Friday to Sunday the target weekend is the one in progress; from
//! Monday to Thursday it is the coming one. The calendar day is taken in the
//! configured timezone (`Europe/Paris` by default).
//!
//! ## Usage
//!
//! ```bash
//! # Interactive board (default)
//! hoteltask
//!
//! # Add a one-off task for Saturday of the target weekend
//! hoteltask add "Clean the gutter" --due 2025-01-11
//!
//! # Add a task that comes back every weekend
//! hoteltask add "Start the machines" --due 2025-01-10 --recurring
//!
//! # Load the sample weekly list
//! hoteltask definitions import demos/weekly_list.jsonl
//!
//! # Show the target weekend
//! hoteltask weekend
//!
//! # Preview, then run, the weekly generation
//! hoteltask generate --dry-run
//! hoteltask generate --json
//! ```
//!
//! Adding a task that is already open for the same day is a no-op that
//! reports the existing task.
//!
//! ## Data Storage
//!
//! Tasks live in `tasks.json` and the weekly list in `definitions.jsonl`
//! (one definition per line, safe to edit by hand) under the data directory:
//! *   Linux: `~/.local/share/hoteltask/`
//! *   macOS: `~/Library/Application Support/hoteltask/`
//!
//! Override it with `data_dir` in `config.toml` or the `HOTELTASK_DATA_DIR`
//! environment variable.
//!
//! Every command, the TUI and the cron job lock `<data_dir>/.lock` while they
//! read and write, so they can safely run at the same time.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use hoteltask::commands::*;
use hoteltask::config::{load_config, Config};
use hoteltask::listing::TaskQuery;
use hoteltask::tui::run_tui;

#[derive(Parser)]
#[command(name = "hoteltask")]
#[command(about = "Weekend checklist for hotel operations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task unless the same one is already open
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Due date in YYYY-MM-DD (default: today during the weekend, else Friday)
        #[arg(short, long)]
        due: Option<String>,
        /// Recreate this task every weekend
        #[arg(short, long)]
        recurring: bool,
        /// Position within the day
        #[arg(short, long)]
        order: Option<i64>,
    },
    /// List tasks, open first
    List {
        /// First due date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last due date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        done: bool,
        /// Only open tasks
        #[arg(long)]
        open: bool,
        /// Maximum number of tasks (1-1000)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Number of tasks to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show the target weekend
    Weekend,
    /// Show all tasks grouped by weekend
    History,
    /// Show completed tasks grouped by completion day
    Completed,
    /// Mark a task done, or reopen it
    Toggle {
        id: u64,
    },
    /// Edit a task
    Edit {
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        /// New position within the day
        #[arg(short, long)]
        order: Option<i64>,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Delete all tasks (the weekly list is kept)
    Clear {
        /// Only count what would be deleted
        #[arg(long)]
        dry_run: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Manage the weekly list of recurring tasks
    Definitions {
        #[command(subcommand)]
        command: DefinitionCommands,
    },
    /// Create this weekend's tasks from the weekly list
    Generate {
        /// Report what would happen without writing
        #[arg(long)]
        dry_run: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum DefinitionCommands {
    /// List the weekly list by day and order
    List,
    /// Append a recurring task to the weekly list
    Add {
        /// Task title
        title: String,
        /// Day: fri, sat, sun (or 0, 1, 2)
        #[arg(short, long)]
        day: String,
    },
    /// Append the definitions of a JSONL file (see demos/weekly_list.jsonl)
    Import {
        /// File with one {"title", "day_offset", "order"} object per line
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init,
}

fn init_logging(cfg: &Config, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    if tui {
        std::fs::create_dir_all(&cfg.data_dir)
            .with_context(|| format!("create {}", cfg.data_dir.display()))?;
        let path = cfg.data_dir.join("hoteltask.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(filter)
            .init();
    }
    Ok(())
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = load_config()?;
    let tui = matches!(cli.command, None | Some(Commands::Ui));
    init_logging(&cfg, tui)?;

    let command = match cli.command {
        Some(Commands::Config { command }) => {
            match command {
                ConfigCommands::Show => cmd_config_show(&cfg)?,
                ConfigCommands::Init => cmd_config_init()?,
            }
            return Ok(0);
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("Unsupported shell: {}", shell),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "hoteltask", &mut io::stdout());
            return Ok(0);
        }
        other => other,
    };

    let svc = open_service(&cfg)?;
    match command {
        Some(Commands::Add { title, due, recurring, order }) => cmd_add(&svc, title, due, recurring, order)?,
        Some(Commands::List { from, to, done, open, limit, offset }) => {
            let query = TaskQuery {
                from: from.as_deref().map(hoteltask::dedup::parse_due_date).transpose()?,
                to: to.as_deref().map(hoteltask::dedup::parse_due_date).transpose()?,
                is_done: if done { Some(true) } else if open { Some(false) } else { None },
                limit,
                offset,
            };
            cmd_list(&svc, query)?
        }
        Some(Commands::Weekend) => cmd_weekend(&svc)?,
        Some(Commands::History) => cmd_history(&svc)?,
        Some(Commands::Completed) => cmd_completed(&svc)?,
        Some(Commands::Toggle { id }) => cmd_toggle(&svc, id)?,
        Some(Commands::Edit { id, title, due, order }) => cmd_edit(&svc, id, title, due, order)?,
        Some(Commands::Remove { id }) => cmd_remove(&svc, id)?,
        Some(Commands::Clear { dry_run, force }) => cmd_clear(&svc, dry_run, force)?,
        Some(Commands::Definitions { command }) => match command {
            DefinitionCommands::List => cmd_definitions_list(&svc)?,
            DefinitionCommands::Add { title, day } => cmd_definitions_add(&svc, title, day)?,
            DefinitionCommands::Import { path } => cmd_definitions_import(&svc, &path)?,
        },
        Some(Commands::Generate { dry_run, json }) => return cmd_generate(&svc, dry_run, json),
        Some(Commands::Ui) | None => {
            run_tui(&svc).map_err(|e| anyhow::anyhow!("Error running TUI: {e}"))?
        }
        Some(Commands::Config { .. }) | Some(Commands::Completions { .. }) => {}
    }
    Ok(0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
