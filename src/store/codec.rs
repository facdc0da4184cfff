//! Line codec for the backing file.
//!
//! Every task is stored on its own line as four tab-separated fields:
//!
//! ```text
//! <id> TAB <label> TAB <due> TAB <done>
//! ```
//!
//! - `id` is a decimal integer, at least 1
//! - `label` is escaped: `\` as `\\`, tab as `\t`, newline as `\n`,
//!   carriage return as `\r`; no other escapes exist
//! - `due` is `DD-MM-YYYY`, years 0 and up; negative years have no line
//!   form and are refused before a task is built
//! - `done` is `true` or `false`
//!
//! Blank lines decode to nothing so that a trailing newline or a hand-edited
//! file with spacing still loads.

use thiserror::Error;

use crate::models::{Task, TaskId};
use crate::utils::date::{format_due, parse_due_strict};

const SEPARATOR: char = '\t';
const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("expected 4 tab-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid id '{0}'")]
    BadId(String),
    #[error("invalid due date '{0}'")]
    BadDate(String),
    #[error("invalid done flag '{0}'")]
    BadFlag(String),
    #[error("invalid escape sequence '\\{0}' in label")]
    BadEscape(String),
    #[error("invalid UTF-8 after byte {0}")]
    BadEncoding(usize),
}

/// Encode a task as one line, without the trailing newline
pub fn encode(task: &Task) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}",
        task.id,
        escape_label(&task.label),
        format_due(task.due),
        task.done,
        sep = SEPARATOR
    )
}

/// Decode one line; `Ok(None)` for blank lines
pub fn decode(line: &str) -> Result<Option<Task>, CodecError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(CodecError::FieldCount(fields.len()));
    }

    let id = parse_id(fields[0])?;
    let label = unescape_label(fields[1])?;
    let due = parse_due_strict(fields[2]).map_err(|_| CodecError::BadDate(fields[2].to_string()))?;
    let done = match fields[3] {
        "true" => true,
        "false" => false,
        other => return Err(CodecError::BadFlag(other.to_string())),
    };

    Ok(Some(Task { id, label, due, done }))
}

fn parse_id(raw: &str) -> Result<TaskId, CodecError> {
    // Reject signs and whitespace that str::parse would otherwise let through
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::BadId(raw.to_string()));
    }
    match raw.parse::<TaskId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CodecError::BadId(raw.to_string())),
    }
}

fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_label(raw: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(CodecError::BadEscape(other.to_string())),
            None => return Err(CodecError::BadEscape(String::new())),
        }
    }
    Ok(out)
}
