use std::io::Write;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use crate::cli::abbrev;
use crate::cli::error::{user_error, EXIT_USER_ERROR};
use crate::cli::output::{format_task_list_json, format_task_list_table, format_task_summary, TaskListOptions};
use crate::config::Config;
use crate::models::{Operation, Outcome, Task, TaskId};
use crate::repo::BatchOutcome;
use crate::store::Store;
use crate::tui;

#[derive(Parser)]
#[command(name = "tdl")]
#[command(about = "To-Do Ledger - a personal task list for the command line and the terminal")]
#[command(long_about = "To-Do Ledger - a personal task list for the command line and the terminal.\n\nRun without a command to open the interactive view.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    #[command(visible_alias = "a")]
    Add {
        /// Task label (quote it if it contains spaces)
        #[arg(allow_hyphen_values = true)]
        label: String,
        /// Due date: DD-MM-YY, DD-MM-YYYY, today or tomorrow
        due: String,
    },
    /// Change the label and due date of a task
    #[command(visible_alias = "e")]
    Edit {
        /// Task ID
        id: TaskId,
        /// New task label
        #[arg(allow_hyphen_values = true)]
        label: String,
        /// New due date: DD-MM-YY, DD-MM-YYYY, today or tomorrow
        due: String,
    },
    /// Mark task(s) as done
    #[command(visible_alias = "m")]
    Mark {
        /// Task IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TaskId>,
    },
    /// Mark task(s) as not done
    #[command(visible_alias = "u")]
    Unmark {
        /// Task IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TaskId>,
    },
    /// List all tasks
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show tasks whose label contains a keyword (case-insensitive)
    #[command(visible_alias = "s")]
    Search {
        /// Keyword to look for
        #[arg(allow_hyphen_values = true)]
        keyword: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show tasks sorted by_date or by_status
    Sort {
        /// Sort criterion: by_date or by_status
        criterion: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Permanently delete task(s)
    #[command(visible_aliases = ["d", "rm"])]
    Delete {
        /// Task IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TaskId>,
    },
    /// Open the interactive view
    Ui,
}

/// Display flags shared by the listing commands
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct ViewArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
    /// Show due dates as relative time (e.g., "tomorrow", "in 3 days")
    #[arg(long)]
    pub relative: bool,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Expand command abbreviations before processing
    let args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };

    let clap_args = std::iter::once("tdl".to_string()).chain(args).collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                return Ok(());
            }
            ErrorKind::InvalidSubcommand => {
                e.print()?;
                eprintln!();
                eprintln!("{}", Cli::command().render_help());
                process::exit(EXIT_USER_ERROR);
            }
            _ => {
                e.print()?;
                process::exit(EXIT_USER_ERROR);
            }
        },
    };

    let config = Config::resolve().context("Failed to resolve configuration")?;
    log::debug!("Using task file {}", config.data_location.display());
    let store = Store::new(config.data_location);

    handle_command(cli, &store)
}

fn handle_command(cli: Cli, store: &Store) -> Result<()> {
    let (operation, view) = match cli.command {
        None | Some(Commands::Ui) => return tui::run(store),
        Some(Commands::Add { label, due }) => (Operation::add(label, &due)?, ViewArgs::default()),
        Some(Commands::Edit { id, label, due }) => (Operation::edit(id, label, &due)?, ViewArgs::default()),
        Some(Commands::Mark { ids }) => (Operation::Mark { ids }, ViewArgs::default()),
        Some(Commands::Unmark { ids }) => (Operation::Unmark { ids }, ViewArgs::default()),
        Some(Commands::Delete { ids }) => (Operation::Delete { ids }, ViewArgs::default()),
        Some(Commands::List { view }) => (Operation::List, view),
        Some(Commands::Search { keyword, view }) => (Operation::Search { keyword }, view),
        Some(Commands::Sort { criterion, view }) => (Operation::sort(&criterion)?, view),
    };

    let outcome = execute(store, operation)?;
    report(&outcome, view)
}

/// One load → apply → save cycle
pub fn execute(store: &Store, operation: Operation) -> Result<Outcome> {
    let mut tasks = store
        .load()
        .with_context(|| format!("Failed to load tasks from {}", store.path().display()))?;

    let mutating = operation.is_mutating();
    let outcome = operation.apply(&mut tasks)?;

    if mutating {
        store
            .save(&tasks)
            .with_context(|| format!("Failed to save tasks to {}", store.path().display()))?;
    }
    Ok(outcome)
}

fn report(outcome: &Outcome, view: ViewArgs) -> Result<()> {
    match outcome {
        Outcome::Added(task) => println!("Created task {}", format_task_summary(task)),
        Outcome::Edited(task) => println!("Modified task {}", format_task_summary(task)),
        Outcome::Marked(batch) => report_batch(batch, |t| format!("Marked task {} done: {}", t.id, t.label))?,
        Outcome::Unmarked(batch) => report_batch(batch, |t| format!("Unmarked task {}: {}", t.id, t.label))?,
        Outcome::Deleted(batch) => report_batch(batch, |t| format!("Deleted task {}: {}", t.id, t.label))?,
        Outcome::Listed(tasks) => print_tasks(tasks, view)?,
    }
    Ok(())
}

fn report_batch(batch: &BatchOutcome, describe: impl Fn(&Task) -> String) -> Result<()> {
    for task in &batch.affected {
        println!("{}", describe(task));
    }
    for id in &batch.missing {
        eprintln!("Warning: Task {} not found, skipping", id);
    }

    match batch.not_found_errors().into_iter().next() {
        None => Ok(()),
        Some(first) => {
            let message = format!("{} task(s) not found", batch.missing.len());
            Err(anyhow::Error::new(first).context(message))
        }
    }
}

fn print_tasks(tasks: &[Task], view: ViewArgs) -> Result<()> {
    let rendered = if view.json {
        let mut json = format_task_list_json(tasks).context("Failed to serialize tasks")?;
        json.push('\n');
        json
    } else {
        format_task_list_table(tasks, &TaskListOptions::for_terminal(view.relative))
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
