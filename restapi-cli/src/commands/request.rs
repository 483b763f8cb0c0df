// restapi-cli/src/commands/request.rs
use crate::output::{body_to_value, print_response, Response};
use anyhow::{Context, Result};
use restapi_client::{ApiClient, HttpTransport};
use tracing::debug;

/// Send one raw request and print its body inside the envelope.
pub async fn handle_request<T: HttpTransport>(
    client: &ApiClient<T>,
    method: &str,
    path: &str,
    data: Option<&str>,
) -> Result<()> {
    let method = method.to_ascii_uppercase();
    debug!(%method, path, has_body = data.is_some(), "sending raw request");
    let body = client
        .send_request(&method, path, data.unwrap_or_default())
        .await
        .with_context(|| format!("{} {} failed", method, path))?;

    print_response(&Response::ok(body_to_value(body)))
}
