use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task identifier as shown to the user and addressed by the CLI
pub type TaskId = u32;

/// Task model
///
/// A task is created by `add`, changed in place by `edit`/`mark`/`unmark`
/// and removed by `delete`. The id never changes during its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub label: String,
    #[serde(with = "due_format")]
    pub due: NaiveDate,
    pub done: bool,
}

impl Task {
    /// Create a new, not yet completed task
    pub fn new(id: TaskId, label: impl Into<String>, due: NaiveDate) -> Self {
        Self {
            id,
            label: label.into(),
            due,
            done: false,
        }
    }

    /// Check if the task is past its due date and still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.done && self.due < today
    }
}

// JSON output uses the same day-month-year form as the backing file
mod due_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::date::{format_due, parse_due_strict};

    pub fn serialize<S: Serializer>(due: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_due(*due))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_due_strict(&raw).map_err(serde::de::Error::custom)
    }
}
