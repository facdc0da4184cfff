//! tdl (To-Do Ledger) - a personal task list for the command line and the terminal
//!
//! This library provides the core functionality for tdl, including:
//! - A line codec and an atomically-rewritten flat-file store
//! - The task model and the operations over it (add, edit, mark, delete,
//!   search, sort, list)
//! - Configuration of the backing file location
//! - CLI command parsing and execution
//! - An interactive terminal view
//!
//! # Example
//!
//! ```no_run
//! use tdl::models::Operation;
//! use tdl::store::Store;
//!
//! let store = Store::new("/tmp/tasks.txt");
//! let mut tasks = store.load()?;
//! Operation::add("Buy milk", "01-01-25")?.apply(&mut tasks)?;
//! store.save(&tasks)?;
//! # Ok::<(), tdl::error::TaskError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod store;
pub mod tui;
pub mod utils;
