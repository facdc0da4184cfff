use chrono::NaiveDate;
use log::debug;

use crate::error::{Result, TaskError};
use crate::models::{Task, TaskId};
use crate::repo::{BatchOutcome, SortCriterion, TaskRepo};
use crate::utils::date::parse_due;

/// Every operation a front end can request
///
/// Arguments are already validated: due dates are parsed and sort criteria
/// resolved by the constructors below, so `apply` only fails on state
/// (a missing id, an empty label, no free id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add { label: String, due: NaiveDate },
    Edit { id: TaskId, label: String, due: NaiveDate },
    Mark { ids: Vec<TaskId> },
    Unmark { ids: Vec<TaskId> },
    Delete { ids: Vec<TaskId> },
    Search { keyword: String },
    Sort { criterion: SortCriterion },
    List,
}

/// What an applied operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Task),
    Edited(Task),
    Marked(BatchOutcome),
    Unmarked(BatchOutcome),
    Deleted(BatchOutcome),
    Listed(Vec<Task>),
}

impl Operation {
    /// Build an `Add` from a raw due token
    pub fn add(label: impl Into<String>, due: &str) -> Result<Self> {
        Ok(Operation::Add {
            label: label.into(),
            due: parse_due(due)?,
        })
    }

    /// Build an `Edit` from a raw due token
    pub fn edit(id: TaskId, label: impl Into<String>, due: &str) -> Result<Self> {
        Ok(Operation::Edit {
            id,
            label: label.into(),
            due: parse_due(due)?,
        })
    }

    /// Build a `Sort` from a raw criterion token
    pub fn sort(criterion: &str) -> Result<Self> {
        Ok(Operation::Sort {
            criterion: criterion.parse()?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Edit { .. } => "edit",
            Operation::Mark { .. } => "mark",
            Operation::Unmark { .. } => "unmark",
            Operation::Delete { .. } => "delete",
            Operation::Search { .. } => "search",
            Operation::Sort { .. } => "sort",
            Operation::List => "list",
        }
    }

    /// Whether the snapshot must be saved after `apply`
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::Add { .. }
                | Operation::Edit { .. }
                | Operation::Mark { .. }
                | Operation::Unmark { .. }
                | Operation::Delete { .. }
        )
    }

    pub fn apply(self, tasks: &mut Vec<Task>) -> Result<Outcome> {
        debug!("Applying {} to {} task(s)", self.name(), tasks.len());
        let outcome = match self {
            Operation::Add { label, due } => Outcome::Added(TaskRepo::add(tasks, &label, due)?),
            Operation::Edit { id, label, due } => {
                Outcome::Edited(TaskRepo::edit(tasks, id, &label, due)?)
            }
            Operation::Mark { ids } => Outcome::Marked(TaskRepo::mark(tasks, &ids)),
            Operation::Unmark { ids } => Outcome::Unmarked(TaskRepo::unmark(tasks, &ids)),
            Operation::Delete { ids } => Outcome::Deleted(TaskRepo::delete(tasks, &ids)),
            Operation::Search { keyword } => Outcome::Listed(TaskRepo::search(tasks, &keyword)),
            Operation::Sort { criterion } => Outcome::Listed(TaskRepo::sort(tasks, criterion)),
            Operation::List => Outcome::Listed(TaskRepo::list(tasks)),
        };
        Ok(outcome)
    }
}

impl Outcome {
    /// Ids that a batch operation could not find
    pub fn missing(&self) -> &[TaskId] {
        match self {
            Outcome::Marked(batch) | Outcome::Unmarked(batch) | Outcome::Deleted(batch) => {
                &batch.missing
            }
            _ => &[],
        }
    }

    /// First `NotFound` of a partially applied batch, if any
    pub fn first_missing_error(&self) -> Option<TaskError> {
        self.missing().first().map(|id| TaskError::NotFound(*id))
    }
}
