// restapi-cli/src/commands/setup.rs
use crate::output::{print_error, print_success, ExitCode};
use anyhow::Result;
use dialoguer::{Confirm, Input, Password};
use restapi_config::Config;
use std::path::Path;

/// Run the interactive setup command, writing to `config_path`.
pub async fn run_setup(config_path: &Path) -> Result<ExitCode> {
    println!("REST API client setup");
    println!();

    let uri: String = Input::new()
        .with_prompt("API base URI")
        .interact_text()?;

    if uri.trim().is_empty() {
        print_error("API base URI cannot be empty");
        return Ok(ExitCode::PermanentError);
    }

    let username: String = Input::new()
        .with_prompt("Basic auth username (blank for none)")
        .allow_empty(true)
        .interact_text()?;

    let password = if username.is_empty() {
        String::new()
    } else {
        Password::new()
            .with_prompt("Basic auth password")
            .allow_empty_password(true)
            .interact()?
    };

    let sign = Confirm::new()
        .with_prompt("Sign requests with SigV4?")
        .default(true)
        .interact()?;

    let mut config = Config::default();
    config.api.uri = uri.trim().to_string();
    config.auth.username = (!username.is_empty()).then_some(username);
    config.auth.password = (!password.is_empty()).then_some(password);
    config.signing.enabled = sign;

    println!();
    println!("Validating configuration...");

    if let Err(e) = config.build_client() {
        print_error(&format!("{:#}", e));
        return Ok(ExitCode::PermanentError);
    }

    if let Err(e) = config.save_to(config_path) {
        print_error(&format!("Couldn't write config file: {}", e));
        return Ok(ExitCode::PermanentError);
    }

    print_success(&format!("Configuration saved to {}", config_path.display()));
    println!();
    println!("Try: restapi request GET /");

    Ok(ExitCode::Success)
}
