// restapi-cli/src/commands/config.rs
use crate::output::{print_response, Response};
use anyhow::Result;
use restapi_config::Config;
use serde_json::Value;
use std::path::Path;

#[derive(clap::Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Print the config file location
    Path,
}

/// `config_path` is the file in use, from `--config` or the default location.
pub fn handle_config_command(config: &Config, config_path: &Path, cmd: ConfigCommands) -> Result<()> {
    print_response(&Response::ok(config_result(config, config_path, &cmd)?))
}

fn config_result(config: &Config, config_path: &Path, cmd: &ConfigCommands) -> Result<Value> {
    Ok(match cmd {
        ConfigCommands::Show => serde_json::to_value(config.redacted())?,
        ConfigCommands::Path => serde_json::json!({
            "path": config_path.display().to_string()
        }),
    })
}
