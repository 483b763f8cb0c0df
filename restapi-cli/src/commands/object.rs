// restapi-cli/src/commands/object.rs
use crate::output::{print_response, ErrorResponse, ExitCode, Response};
use anyhow::{anyhow, Context, Result};
use restapi_client::{ApiClient, ApiObject, HttpTransport};
use serde_json::Value;

#[derive(clap::Subcommand, Clone, Debug)]
pub enum ObjectCommands {
    /// Create an object under a collection path
    Create {
        /// Collection path, e.g. /widgets
        path: String,
        /// JSON object to send
        #[arg(short, long)]
        data: String,
    },
    /// Read an object
    Read {
        path: String,
        id: String,
    },
    /// Replace an object's data
    Update {
        path: String,
        id: String,
        /// JSON object to send
        #[arg(short, long)]
        data: String,
    },
    /// Delete an object
    Delete {
        path: String,
        id: String,
        /// Confirm destructive operation
        #[arg(long)]
        force: bool,
    },
}

/// Returns the exit code the process should end with.
pub async fn handle_object_command<T: HttpTransport>(
    client: &ApiClient<T>,
    cmd: ObjectCommands,
) -> Result<ExitCode> {
    match cmd {
        ObjectCommands::Create { path, data } => {
            let data = parse_data(&data)?;
            let object = client
                .create_object(&path, &data)
                .await
                .with_context(|| format!("Couldn't create object under {}", path))?;
            print_response(&Response::ok(object))?;
        }
        ObjectCommands::Read { path, id } => {
            let object = client
                .read_object(&path, &id)
                .await
                .with_context(|| format!("Couldn't read {}/{}", path, id))?;
            print_response(&Response::ok(object))?;
        }
        ObjectCommands::Update { path, id, data } => {
            let data = parse_data(&data)?;
            let current = client
                .read_object(&path, &id)
                .await
                .with_context(|| format!("Couldn't read {}/{}", path, id))?;
            let updated = client
                .update_object(&current, &data)
                .await
                .with_context(|| format!("Couldn't update {}/{}", path, id))?;
            print_response(&Response::ok(updated))?;
        }
        ObjectCommands::Delete { path, id, force } => {
            if !force {
                let resp = Response::<()>::error(ErrorResponse::safety_rejected(
                    "--force flag is required for delete operations".to_string(),
                ));
                print_response(&resp)?;
                return Ok(ExitCode::SafetyRejected);
            }

            let object = ApiObject {
                path,
                id,
                data: Value::Null,
            };
            client
                .delete_object(&object)
                .await
                .with_context(|| format!("Couldn't delete {}", object.object_path()))?;
            print_response(&Response::ok(serde_json::json!({
                "id": object.id,
                "deleted": true
            })))?;
        }
    }
    Ok(ExitCode::Success)
}

fn parse_data(data: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    if !value.is_object() {
        return Err(anyhow!("--data must be a JSON object"));
    }
    Ok(value)
}
