//! Command-line front end: flag parsing and command dispatch.

mod args;
mod commands;

pub use args::Cli;
pub use commands::execute;
