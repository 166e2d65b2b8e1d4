//! Command-line interface for mdrecall

pub mod args;

pub use args::{Args, Commands, Verbosity};
