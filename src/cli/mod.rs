//! Command-line interface for loadgate.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`output`] - Terminal styling and the loading spinner

pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Commands, PlanArgs, WaitArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
