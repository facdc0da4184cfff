// Due date parsing and formatting
//
// Due dates are plain calendar dates written day-month-year. The backing
// file always uses the canonical DD-MM-YYYY form; user input may also use a
// two-digit year or a relative keyword.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::TaskError;

/// Format a due date in canonical form (DD-MM-YYYY)
pub fn format_due(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}

/// Parse a user-supplied due date expression relative to the local date
///
/// Accepts `DD-MM-YY` (years 2000-2099), `DD-MM-YYYY`, `today` and `tomorrow`.
pub fn parse_due(expr: &str) -> Result<NaiveDate, TaskError> {
    parse_due_relative_to(expr, Local::now().date_naive())
}

/// Parse a due date expression, resolving relative keywords against `today`
pub fn parse_due_relative_to(expr: &str, today: NaiveDate) -> Result<NaiveDate, TaskError> {
    let expr = expr.trim();
    match expr.to_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    let (day, month, year) = split_parts(expr)
        .ok_or_else(|| TaskError::InvalidDate(expr.to_string()))?;
    if day.len() > 2 || month.len() > 2 {
        return Err(TaskError::InvalidDate(expr.to_string()));
    }
    let year = match year.len() {
        2 => 2000 + parse_number(year, expr)?,
        n if n >= 4 => parse_number(year, expr)?,
        _ => return Err(TaskError::InvalidDate(expr.to_string())),
    };

    build_date(expr, day, month, year)
}

/// Parse the canonical DD-MM-YYYY form written by [`format_due`]
pub fn parse_due_strict(raw: &str) -> Result<NaiveDate, TaskError> {
    let (day, month, year) = split_parts(raw)
        .ok_or_else(|| TaskError::InvalidDate(raw.to_string()))?;
    if day.len() != 2 || month.len() != 2 || year.len() < 4 {
        return Err(TaskError::InvalidDate(raw.to_string()));
    }
    let year = parse_number(year, raw)?;
    build_date(raw, day, month, year)
}

fn split_parts(expr: &str) -> Option<(&str, &str, &str)> {
    let mut parts = expr.split('-');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(day) && all_digits(month) && all_digits(year) {
        Some((day, month, year))
    } else {
        None
    }
}

fn parse_number(digits: &str, expr: &str) -> Result<i32, TaskError> {
    digits
        .parse::<i32>()
        .map_err(|_| TaskError::InvalidDate(expr.to_string()))
}

fn build_date(expr: &str, day: &str, month: &str, year: i32) -> Result<NaiveDate, TaskError> {
    let day = parse_number(day, expr)?;
    let month = parse_number(month, expr)?;
    // parse_number only sees ASCII digits, so both values are non-negative
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| TaskError::InvalidDate(expr.to_string()))
}
