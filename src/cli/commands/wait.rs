//! Wait command implementation.
//!
//! The `loadgate wait` command activates one or more requesters against
//! an HTTP-backed gate on a single-threaded runtime and blocks until all
//! of them observe the dependency as ready.

use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::WaitArgs;
use crate::cli::output::{LoadingSpinner, Theme};
use crate::config::GateConfig;
use crate::coordinator::{GateStats, LoadCoordinator};
use crate::environment::Environment;
use crate::error::Result;
use crate::http::HttpLoader;
use crate::initiator::LoadInitiator;
use crate::probe::EntryPointProbe;

use super::dispatcher::{Command, CommandResult};

/// Exit code when `--timeout-secs` elapses before readiness.
pub const EXIT_TIMED_OUT: i32 = 2;

/// The wait command implementation.
pub struct WaitCommand {
    config: GateConfig,
    args: WaitArgs,
}

impl WaitCommand {
    /// Create a new wait command.
    pub fn new(config: GateConfig, args: WaitArgs) -> Self {
        Self { config, args }
    }

    /// Build the gate over a fresh environment.
    pub fn build_gate(&self, env: Arc<Environment>) -> LoadCoordinator {
        let mut settings = self.config.settings();
        if let Some(ms) = self.args.poll_interval_ms {
            settings.poll_interval = Duration::from_millis(ms);
        }

        let probe = EntryPointProbe::new(
            Arc::clone(&env),
            &self.config.readiness.namespace,
            &self.config.readiness.entry_point,
        );
        let loader = HttpLoader::with_timeout(env, self.config.fetch_timeout());
        let initiator = LoadInitiator::new(self.config.endpoint(), Arc::new(loader));
        LoadCoordinator::new(Arc::new(probe), initiator, settings)
    }

    /// Activate all requesters and wait for them.
    ///
    /// Returns the gate's stats once every requester is ready, or `None`
    /// if the timeout elapsed first.
    pub async fn run(
        &self,
        gate: &LoadCoordinator,
        spinner: &LoadingSpinner,
    ) -> Result<Option<GateStats>> {
        let options = self.config.load_options();
        let requesters = (0..self.args.requesters)
            .map(|_| gate.activate(&options))
            .collect::<Result<Vec<_>>>()?;
        spinner.set_message(&format!(
            "waiting for {} requester(s)...",
            requesters.len()
        ));

        let all_ready = async {
            for requester in &requesters {
                requester.ready().await;
            }
        };

        match self.args.timeout_secs {
            Some(secs) => {
                if tokio::time::timeout(Duration::from_secs(secs), all_ready)
                    .await
                    .is_err()
                {
                    return Ok(None);
                }
            }
            None => all_ready.await,
        }

        Ok(Some(gate.stats()))
    }
}

impl Command for WaitCommand {
    fn execute(&self) -> Result<CommandResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let gate = self.build_gate(Arc::new(Environment::interactive()));
        // Debug logs share stderr with the spinner.
        let spinner = if tracing::enabled!(tracing::Level::DEBUG) {
            LoadingSpinner::hidden()
        } else {
            LoadingSpinner::new("loading...")
        };
        let outcome = runtime.block_on(self.run(&gate, &spinner));
        spinner.finish();

        let theme = Theme::new();
        match outcome? {
            Some(stats) => {
                println!(
                    "{} {} requester(s){}",
                    theme.success.apply_to("ready:"),
                    self.args.requesters,
                    theme
                        .dim
                        .apply_to(format!(", {} load(s) issued", stats.loads_issued))
                );
                Ok(CommandResult::success())
            }
            None => {
                eprintln!(
                    "{} dependency not ready after {}s",
                    theme.error.apply_to("timed out:"),
                    self.args.timeout_secs.unwrap_or_default()
                );
                Ok(CommandResult::failure(EXIT_TIMED_OUT))
            }
        }
    }
}
