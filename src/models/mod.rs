// Core data models for tdl

pub mod operation;
pub mod task;

pub use operation::*;
pub use task::*;
