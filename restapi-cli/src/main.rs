// restapi-cli/src/main.rs
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    handle_config_command, handle_object_command, handle_request, run_setup, ConfigCommands,
    ObjectCommands,
};
use output::{print_response, ErrorResponse, ExitCode, Response};
use restapi_config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restapi")]
#[command(about = "Send signed, authenticated requests to a REST API", long_about = None)]
struct Cli {
    /// Trace requests and responses to stderr
    #[arg(long, global = true)]
    debug: bool,
    /// Config file [default: <config dir>/restapi/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the API base URI
    #[arg(long, global = true)]
    uri: Option<String>,
    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a raw request
    Request {
        /// HTTP method
        method: String,
        /// Path appended to the base URI, e.g. /widgets/1
        path: String,
        /// Request body (sent as application/json)
        #[arg(short, long)]
        data: Option<String>,
    },
    #[command(flatten)]
    Object(ObjectCommands),
    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Interactive first-time setup
    Setup,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let resp = Response::<()>::error(ErrorResponse::from_error(&e));
            if print_response(&resp).is_err() {
                output::print_error(&format!("{:#}", e));
            }
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(code.code());
}

/// Default filter when `RUST_LOG` is unset.
fn log_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line flags win over the config file.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(uri) = &cli.uri {
        config.api.uri = uri.clone();
    }
    config.api.insecure |= cli.insecure;
    config.api.debug |= cli.debug;
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    if let Commands::Setup = cli.command {
        init_tracing(cli.debug);
        return run_setup(&config_path).await;
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_cli_overrides(&mut config, &cli);
    init_tracing(config.api.debug);

    match cli.command {
        Commands::Request { method, path, data } => {
            let client = config.build_client()?;
            handle_request(&client, &method, &path, data.as_deref()).await?;
            Ok(ExitCode::Success)
        }
        Commands::Object(cmd) => {
            let client = config.build_client()?;
            handle_object_command(&client, cmd).await
        }
        Commands::Config(cmd) => {
            handle_config_command(&config, &config_path, cmd)?;
            Ok(ExitCode::Success)
        }
        Commands::Setup => run_setup(&config_path).await,
    }
}
