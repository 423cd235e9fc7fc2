//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, GateConfig};
use crate::error::Result;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher that looks for config in `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the directory searched for `loadgate.yml`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load config and apply command-line overrides.
    pub fn resolve_config(&self, cli: &Cli) -> Result<GateConfig> {
        let mut config = load_config(cli.config.as_deref(), &self.root)?;
        if let Some(identifier) = &cli.identifier {
            config.identifier = Some(identifier.clone());
        }
        if let Some(alternate) = &cli.alternate {
            config.alternate_address = Some(alternate.clone());
        }
        Ok(config)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        let config = self.resolve_config(cli)?;
        match &cli.command {
            Commands::Plan(args) => {
                let cmd = super::plan::PlanCommand::new(config, args.clone());
                cmd.execute()
            }
            Commands::Wait(args) => {
                let cmd = super::wait::WaitCommand::new(config, args.clone());
                cmd.execute()
            }
        }
    }
}
