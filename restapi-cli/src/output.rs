// restapi-cli/src/output.rs
use restapi_client::ApiError;
use serde::Serialize;
use serde_json::Value;

/// Standard JSON response envelope
#[derive(Debug, Serialize)]
pub struct Response<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

impl<T> Response<T> {
    pub fn ok(result: T) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(error: ErrorResponse) -> Response<()> {
        Response::<()> {
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    type_: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    retryable: bool,
}

impl ErrorResponse {
    pub fn safety_rejected(message: String) -> Self {
        Self {
            type_: "safety_rejected",
            message,
            status: None,
            retryable: false,
        }
    }

    pub fn validation_failed(message: String) -> Self {
        Self {
            type_: "validation_failed",
            message,
            status: None,
            retryable: false,
        }
    }

    /// Classify any command failure, looking through to an [`ApiError`]
    /// when there is one.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let message = format!("{:#}", error);
        let Some(api_error) = error.downcast_ref::<ApiError>() else {
            return Self::validation_failed(message);
        };

        let type_ = match api_error {
            ApiError::RequestConstruction(_) => "invalid_request",
            ApiError::Signing(_) => "signing_failed",
            ApiError::Transport(_) => "transport_error",
            ApiError::BodyRead { .. } => "body_read_failed",
            ApiError::UnexpectedStatus { status: 404, .. } => "not_found",
            ApiError::UnexpectedStatus { .. } => "unexpected_status",
            ApiError::TooManyRedirects { .. } => "too_many_redirects",
            ApiError::Resource(_) => "resource_error",
        };

        Self {
            type_,
            message,
            status: api_error.status(),
            retryable: api_error.is_transient(),
        }
    }
}

/// Exit codes for agent decision making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    TransientError = 1,
    PermanentError = 2,
    SafetyRejected = 3,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ApiError>() {
            Some(api_error) if api_error.is_transient() => Self::TransientError,
            _ => Self::PermanentError,
        }
    }
}

/// Response bodies that parse as JSON are embedded as JSON, anything else
/// as a string. An empty body becomes `null`.
pub fn body_to_value(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

// Print response to stdout
pub fn print_response<T: Serialize>(resp: &Response<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

/// Print a styled success message
pub fn print_success(message: &str) {
    let term = console::Term::stdout();
    let _ = term.write_str(&format!("{} {}\n", console::style("✓").green(), message));
}

/// Print a styled error message
pub fn print_error(message: &str) {
    let term = console::Term::stderr();
    let _ = term.write_str(&format!("{} {}\n", console::style("Error:").red(), message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_ok_envelope() {
        let resp = Response::ok(serde_json::json!({"id": "1"}));
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"ok":true,"result":{"id":"1"}}"#
        );
    }

    #[test]
    fn test_not_found_classification() {
        let err = anyhow::Error::new(ApiError::UnexpectedStatus {
            status: 404,
            body: "gone".to_string(),
        });
        let resp = Response::<()>::error(ErrorResponse::from_error(&err));
        let json: Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["type"], "not_found");
        assert_eq!(json["error"]["status"], 404);
        assert_eq!(json["error"]["retryable"], false);
        assert_eq!(ExitCode::for_error(&err), ExitCode::PermanentError);
    }

    #[test]
    fn test_transport_error_is_transient() {
        let err = anyhow::Error::new(ApiError::Transport("connection refused".to_string()));
        assert_eq!(ExitCode::for_error(&err), ExitCode::TransientError);
        assert_eq!(ErrorResponse::from_error(&err).type_, "transport_error");
    }

    #[test]
    fn test_context_keeps_api_error_visible() {
        let err = anyhow::Error::new(ApiError::TooManyRedirects { limit: 5 })
            .context("GET /things failed");
        let resp = ErrorResponse::from_error(&err);
        assert_eq!(resp.type_, "too_many_redirects");
        assert!(resp.message.contains("GET /things failed"));
    }

    #[test]
    fn test_plain_error_is_validation() {
        let err = anyhow!("--data must be JSON");
        assert_eq!(ErrorResponse::from_error(&err).type_, "validation_failed");
        assert_eq!(ExitCode::for_error(&err), ExitCode::PermanentError);
    }

    #[test]
    fn test_body_to_value() {
        assert_eq!(body_to_value(String::new()), Value::Null);
        assert_eq!(body_to_value(r#"{"a":1}"#.to_string())["a"], 1);
        assert_eq!(body_to_value("plain".to_string()), Value::String("plain".to_string()));
    }
}
