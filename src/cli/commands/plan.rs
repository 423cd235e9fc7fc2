//! Plan command implementation.
//!
//! The `loadgate plan` command prints the fetch plan a leader would hand
//! to the loader, without fetching anything.

use crate::cli::args::PlanArgs;
use crate::cli::output::Theme;
use crate::config::GateConfig;
use crate::error::{GateError, Result};
use crate::initiator::FetchPlan;

use super::dispatcher::{Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    config: GateConfig,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(config: GateConfig, args: PlanArgs) -> Self {
        Self { config, args }
    }

    /// Build the plan from the resolved config.
    pub fn plan(&self) -> Result<FetchPlan> {
        let options = self.config.load_options();
        let identifier = options.identifier().ok_or(GateError::MissingIdentifier)?;
        self.config
            .endpoint()
            .plan(identifier, options.alternate_address())
    }

    /// Render the plan as it is printed.
    pub fn render(&self, plan: &FetchPlan) -> Result<String> {
        if self.args.json {
            return serde_json::to_string_pretty(plan).map_err(|e| GateError::Other(e.into()));
        }

        let theme = Theme::new();
        let mut lines = vec![
            theme.key_value("target", &plan.target),
            theme.key_value("callback", &plan.callback),
        ];
        if let Some(key) = &plan.shared_key {
            lines.push(theme.key_value("shared key", &format!("{}={}", key.slot, key.value)));
        }
        Ok(lines.join("\n"))
    }
}

impl Command for PlanCommand {
    fn execute(&self) -> Result<CommandResult> {
        let plan = self.plan()?;
        println!("{}", self.render(&plan)?);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(identifier: Option<&str>, alternate: Option<&str>) -> GateConfig {
        GateConfig {
            identifier: identifier.map(String::from),
            alternate_address: alternate.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn plan_requires_identifier() {
        let cmd = PlanCommand::new(config(None, None), PlanArgs::default());
        assert!(matches!(cmd.plan(), Err(GateError::MissingIdentifier)));
    }

    #[test]
    fn text_output_lists_target_and_callback() {
        console::set_colors_enabled(false);
        let cmd = PlanCommand::new(config(Some("abc"), None), PlanArgs::default());
        let output = cmd.render(&cmd.plan().unwrap()).unwrap();

        assert!(output.contains("target: https://api.map.baidu.com/api?"));
        assert!(output.contains("callback: MapApiLoaderCallback"));
        assert!(!output.contains("shared key"));
    }

    #[test]
    fn text_output_shows_shared_key_for_alternate() {
        console::set_colors_enabled(false);
        let cmd = PlanCommand::new(
            config(Some("abc"), Some("https://boot.example/b.js")),
            PlanArgs::default(),
        );
        let output = cmd.render(&cmd.plan().unwrap()).unwrap();

        assert!(output.contains("target: https://boot.example/b.js"));
        assert!(output.contains("shared key: BMAP_AUTHENTIC_KEY=abc"));
    }

    #[test]
    fn empty_alternate_from_config_uses_default_endpoint() {
        let config = crate::config::parse_config(
            "identifier: abc\nalternate_address: \"\"\n",
            std::path::Path::new("loadgate.yml"),
        )
        .unwrap();
        let plan = PlanCommand::new(config, PlanArgs::default()).plan().unwrap();

        assert!(plan.target.starts_with("https://api.map.baidu.com/api?"));
        assert!(plan.shared_key.is_none());
    }

    #[test]
    fn json_output_is_parseable() {
        let cmd = PlanCommand::new(config(Some("abc"), None), PlanArgs { json: true });
        let output = cmd.render(&cmd.plan().unwrap()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["callback"], "MapApiLoaderCallback");
        assert!(value.get("shared_key").is_none());
    }
}
