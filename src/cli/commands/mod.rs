//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which resolves the
//! config once and routes CLI subcommands to their implementations.

pub mod dispatcher;
pub mod plan;
pub mod wait;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use plan::PlanCommand;
pub use wait::{WaitCommand, EXIT_TIMED_OUT};
