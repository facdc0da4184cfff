// Error handling utilities for consistent error messages and exit codes

use std::process;

use crate::error::TaskError;

/// Exit code for invalid input, missing tasks and usage errors
pub const EXIT_USER_ERROR: i32 = 1;
/// Exit code for I/O failures, corrupt files and other unexpected failures
pub const EXIT_INTERNAL_ERROR: i32 = 2;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(EXIT_USER_ERROR);
}

/// The first `TaskError` anywhere in the error chain
pub fn task_error(err: &anyhow::Error) -> Option<&TaskError> {
    err.chain().find_map(|cause| cause.downcast_ref::<TaskError>())
}

/// Classify an error returned by `run`
///
/// Errors that carry no `TaskError` come from front-end glue (terminal
/// setup, stdout) and count as internal.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match task_error(err) {
        Some(e) if e.is_user_error() => EXIT_USER_ERROR,
        _ => EXIT_INTERNAL_ERROR,
    }
}

/// Render an error the way `main` prints it
pub fn format_error(err: &anyhow::Error) -> String {
    if exit_code_for(err) == EXIT_USER_ERROR {
        return format!("Error: {}", err);
    }

    let mut out = format!("Internal error: {}", err);
    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        out.push_str("\n\nCaused by:");
        for (indent, cause) in causes.enumerate() {
            out.push_str(&format!("\n{:indent$}  {}", "", cause, indent = indent + 1));
        }
    }
    out
}
