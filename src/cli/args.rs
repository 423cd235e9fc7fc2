//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// loadgate - Load a shared dependency once and wait for it to be ready.
#[derive(Debug, Parser)]
#[command(name = "loadgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./loadgate.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Identifier used to fetch the dependency
    #[arg(short, long, global = true, env = "LOADGATE_IDENTIFIER")]
    pub identifier: Option<String>,

    /// Bootstrap address replacing the default endpoint
    #[arg(short, long, global = true, env = "LOADGATE_ALTERNATE")]
    pub alternate: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the fetch plan the first requester would issue
    Plan(PlanArgs),

    /// Load the dependency and wait until it is ready
    Wait(WaitArgs),
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `wait` command.
#[derive(Debug, Clone, clap::Args)]
pub struct WaitArgs {
    /// Number of concurrent requesters to activate
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub requesters: u32,

    /// Give up waiting after this many seconds (the load itself is not cancelled)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Override the delay between readiness checks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,
}

impl Default for WaitArgs {
    fn default() -> Self {
        Self {
            requesters: 1,
            timeout_secs: None,
            poll_interval_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_with_global_flags() {
        let cli = Cli::parse_from(["loadgate", "plan", "--identifier", "abc", "--json"]);
        assert_eq!(cli.identifier.as_deref(), Some("abc"));
        match cli.command {
            Commands::Plan(args) => assert!(args.json),
            other => panic!("expected Plan, got {:?}", other),
        }
    }

    #[test]
    fn parses_wait_arguments() {
        let cli = Cli::parse_from([
            "loadgate",
            "wait",
            "-n",
            "3",
            "--timeout-secs",
            "10",
            "--alternate",
            "https://boot.example/b.js",
        ]);
        assert_eq!(cli.alternate.as_deref(), Some("https://boot.example/b.js"));
        match cli.command {
            Commands::Wait(args) => {
                assert_eq!(args.requesters, 3);
                assert_eq!(args.timeout_secs, Some(10));
                assert!(args.poll_interval_ms.is_none());
            }
            other => panic!("expected Wait, got {:?}", other),
        }
    }

    #[test]
    fn rejects_zero_requesters() {
        let result = Cli::try_parse_from(["loadgate", "wait", "-n", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let result = Cli::try_parse_from(["loadgate", "wait", "--poll-interval-ms", "0"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["loadgate", "wait", "--poll-interval-ms", "1"]);
        match cli.command {
            Commands::Wait(args) => assert_eq!(args.poll_interval_ms, Some(1)),
            other => panic!("expected Wait, got {:?}", other),
        }
    }

    #[test]
    fn wait_args_default_to_one_requester() {
        assert_eq!(WaitArgs::default().requesters, 1);
    }
}
