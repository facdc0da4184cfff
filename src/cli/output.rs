// Output formatting utilities

use chrono::{Local, NaiveDate};
use std::io::IsTerminal;

use crate::models::Task;
use crate::utils::date::format_due;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

const DONE_MARK: &str = "[x]";
const OPEN_MARK: &str = "[ ]";
const MARK_WIDTH: usize = 4;
const ELLIPSIS: char = '…';
const MIN_LABEL_WIDTH: usize = 10;

/// Options for the task list table
#[derive(Debug, Clone, Copy)]
pub struct TaskListOptions {
    /// Show due dates relative to today
    pub relative: bool,
    /// Emit ANSI colors and bold headers
    pub use_color: bool,
    /// Truncate labels to fit this width, if set
    pub max_width: Option<usize>,
    pub today: NaiveDate,
}

impl TaskListOptions {
    /// Options for the current terminal
    pub fn for_terminal(relative: bool) -> Self {
        let tty = is_tty();
        Self {
            relative,
            use_color: tty,
            max_width: tty.then(get_terminal_width),
            today: Local::now().date_naive(),
        }
    }

    /// Plain options, for pipes and tests
    pub fn plain(today: NaiveDate) -> Self {
        Self {
            relative: false,
            use_color: false,
            max_width: None,
            today,
        }
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format a due date for display, relative to `today` if asked
pub fn format_due_display(due: NaiveDate, today: NaiveDate, relative: bool) -> String {
    if relative {
        format_relative_date(due, today)
    } else {
        format_due(due)
    }
}

/// Format date as relative time (e.g., "2 days ago", "in 3 days", "today", "overdue")
pub fn format_relative_date(due: NaiveDate, today: NaiveDate) -> String {
    let days_diff = (due - today).num_days();

    if days_diff < 0 {
        let days = -days_diff;
        if days == 1 || days > 30 {
            "overdue".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if days_diff == 0 {
        "today".to_string()
    } else if days_diff == 1 {
        "tomorrow".to_string()
    } else if days_diff <= 365 {
        format!("in {} days", days_diff)
    } else {
        format_due(due)
    }
}

/// Single-line summary used in confirmations, e.g. `3: Buy milk (due 01-01-2025)`
pub fn format_task_summary(task: &Task) -> String {
    format!(
        "{}: {} (due {}){}",
        task.id,
        single_line(&task.label),
        format_due(task.due),
        if task.done { " [done]" } else { "" }
    )
}

/// Format tasks as an aligned table
pub fn format_task_list_table(tasks: &[Task], options: &TaskListOptions) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let rows: Vec<(String, String, String)> = tasks
        .iter()
        .map(|t| {
            (
                t.id.to_string(),
                format_due_display(t.due, options.today, options.relative),
                single_line(&t.label),
            )
        })
        .collect();

    let id_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max("ID".len());
    let due_width = rows
        .iter()
        .map(|r| r.1.chars().count())
        .max()
        .unwrap_or(0)
        .max("Due".len());
    let label_width = options.max_width.map(|w| {
        // ID, Done and Due columns plus the gaps between them
        let fixed = id_width + 2 + MARK_WIDTH + 1 + due_width + 2;
        w.saturating_sub(fixed).max(MIN_LABEL_WIDTH)
    });

    let mut out = String::new();
    let header = format!(
        "{:<id_width$}  {:<mark_width$} {:<due_width$}  {}",
        "ID",
        "Done",
        "Due",
        "Label",
        id_width = id_width,
        mark_width = MARK_WIDTH,
        due_width = due_width
    );
    out.push_str(&paint(&header, ANSI_BOLD, options.use_color));
    out.push('\n');

    for (task, (id, due, label)) in tasks.iter().zip(rows) {
        let mark = format!("{:<width$}", if task.done { DONE_MARK } else { OPEN_MARK }, width = MARK_WIDTH);
        let mark = if task.done {
            paint(&mark, ANSI_FG_GREEN, options.use_color)
        } else {
            mark
        };
        let due_cell = format!("{:<width$}", due, width = due_width);
        let due_cell = if task.is_overdue(options.today) {
            paint(&due_cell, ANSI_FG_RED, options.use_color)
        } else {
            due_cell
        };
        let label = match label_width {
            Some(width) => truncate(&label, width),
            None => label,
        };
        let label = if task.done {
            paint(&label, ANSI_FG_BRIGHT_BLACK, options.use_color)
        } else {
            label
        };
        out.push_str(&format!("{:<id_width$}  {} {}  {}", id, mark, due_cell, label, id_width = id_width));
        out.push('\n');
    }

    out
}

/// Format tasks as a JSON array
pub fn format_task_list_json(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tasks)
}

// Labels may hold newlines and tabs; keep table rows on one line
fn single_line(label: &str) -> String {
    label
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}
