use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::error::{Result, TaskError};
use crate::models::{Task, TaskId};
use crate::store::next_id;
use crate::utils::date::format_due;

/// Ordering applied by `sort`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    ByDate,
    ByStatus,
}

impl SortCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::ByDate => "by_date",
            SortCriterion::ByStatus => "by_status",
        }
    }
}

impl FromStr for SortCriterion {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "by_date" => Ok(SortCriterion::ByDate),
            "by_status" => Ok(SortCriterion::ByStatus),
            other => Err(TaskError::InvalidCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an operation over a batch of ids
///
/// Ids that matched no task do not stop the batch; they are collected in
/// `missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub affected: Vec<Task>,
    pub missing: Vec<TaskId>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// One `NotFound` per missing id
    pub fn not_found_errors(&self) -> Vec<TaskError> {
        self.missing.iter().map(|id| TaskError::NotFound(*id)).collect()
    }
}

/// Task operations over an in-memory snapshot
///
/// None of these touch the backing file; callers load and save through
/// [`crate::store::Store`].
pub struct TaskRepo;

impl TaskRepo {
    /// Append a new open task with the smallest free id
    pub fn add(tasks: &mut Vec<Task>, label: &str, due: NaiveDate) -> Result<Task> {
        let label = validate_label(label)?;
        validate_due(due)?;
        let id = next_id(tasks)?;
        let task = Task::new(id, label, due);
        tasks.push(task.clone());
        debug!("Added task {}", id);
        Ok(task)
    }

    /// Replace label and due date of a task; id, position and done flag stay
    pub fn edit(tasks: &mut [Task], id: TaskId, label: &str, due: NaiveDate) -> Result<Task> {
        let label = validate_label(label)?;
        validate_due(due)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.label = label.to_string();
        task.due = due;
        debug!("Edited task {}", id);
        Ok(task.clone())
    }

    /// Set the done flag on every task in `ids`
    pub fn set_done(tasks: &mut [Task], ids: &[TaskId], done: bool) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in dedup(ids) {
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.done = done;
                    outcome.affected.push(task.clone());
                }
                None => outcome.missing.push(id),
            }
        }
        debug!(
            "Set done={} on {} task(s), {} missing",
            done,
            outcome.affected.len(),
            outcome.missing.len()
        );
        outcome
    }

    pub fn mark(tasks: &mut [Task], ids: &[TaskId]) -> BatchOutcome {
        Self::set_done(tasks, ids, true)
    }

    pub fn unmark(tasks: &mut [Task], ids: &[TaskId]) -> BatchOutcome {
        Self::set_done(tasks, ids, false)
    }

    /// Remove every task in `ids`
    pub fn delete(tasks: &mut Vec<Task>, ids: &[TaskId]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in dedup(ids) {
            match tasks.iter().position(|t| t.id == id) {
                Some(index) => outcome.affected.push(tasks.remove(index)),
                None => outcome.missing.push(id),
            }
        }
        debug!(
            "Deleted {} task(s), {} missing",
            outcome.affected.len(),
            outcome.missing.len()
        );
        outcome
    }

    /// Tasks whose label contains `keyword`, ignoring case
    pub fn search(tasks: &[Task], keyword: &str) -> Vec<Task> {
        let needle = keyword.to_lowercase();
        tasks
            .iter()
            .filter(|t| t.label.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Stable reordering; equal keys keep their relative order
    pub fn sort(tasks: &[Task], criterion: SortCriterion) -> Vec<Task> {
        let mut sorted = tasks.to_vec();
        match criterion {
            SortCriterion::ByDate => sorted.sort_by_key(|t| t.due),
            SortCriterion::ByStatus => sorted.sort_by_key(|t| t.done),
        }
        sorted
    }

    pub fn list(tasks: &[Task]) -> Vec<Task> {
        tasks.to_vec()
    }
}

fn validate_label(label: &str) -> Result<&str> {
    if label.trim().is_empty() {
        Err(TaskError::EmptyLabel)
    } else {
        Ok(label)
    }
}

// The line format has no room for a sign in front of the year
fn validate_due(due: NaiveDate) -> Result<()> {
    if due.year() < 0 {
        Err(TaskError::InvalidDate(format_due(due)))
    } else {
        Ok(())
    }
}

// First occurrence wins
fn dedup(ids: &[TaskId]) -> Vec<TaskId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
