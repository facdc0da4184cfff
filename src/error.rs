// Typed errors for the record store and the task operations

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::TaskId;
use crate::store::codec::CodecError;

pub type Result<T, E = TaskError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: CodecError,
    },

    #[error("invalid date '{0}': expected DD-MM-YY, DD-MM-YYYY, today or tomorrow")]
    InvalidDate(String),

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("invalid sort criterion '{0}': expected by_date or by_status")]
    InvalidCriterion(String),

    #[error("task label cannot be empty")]
    EmptyLabel,

    #[error("no free task id left")]
    IdsExhausted,

    #[error("configuration error: {0}")]
    Config(String),
}

impl TaskError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// User errors exit with code 1, everything else is internal (code 2)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_) | Self::NotFound(_) | Self::InvalidCriterion(_) | Self::EmptyLabel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(TaskError::NotFound(4).is_user_error());
        assert!(TaskError::InvalidDate("x".into()).is_user_error());
        assert!(TaskError::InvalidCriterion("x".into()).is_user_error());
        assert!(TaskError::EmptyLabel.is_user_error());
        assert!(!TaskError::IdsExhausted.is_user_error());
        assert!(!TaskError::io("/tmp/x", io::Error::from(io::ErrorKind::PermissionDenied)).is_user_error());
        assert!(!TaskError::MalformedRecord { line: 1, source: CodecError::FieldCount(2) }.is_user_error());
    }

    #[test]
    fn test_messages_name_the_subject() {
        assert_eq!(TaskError::NotFound(99).to_string(), "task 99 not found");
        assert!(TaskError::InvalidCriterion("by_name".into()).to_string().contains("by_name"));
        let malformed = TaskError::MalformedRecord { line: 3, source: CodecError::FieldCount(2) };
        assert!(malformed.to_string().contains("line 3"));
    }
}
