// Flat-file persistence: the line codec and the file store built on it

pub mod codec;
pub mod file;

pub use file::*;
