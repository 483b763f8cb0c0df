// restapi-client/src/error.rs
use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The method, URI or a header value could not form a valid request.
    #[error("invalid request: {0}")]
    RequestConstruction(String),

    #[error("request signing failed: {0}")]
    Signing(#[from] SigningError),

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body (status {status}): {message}")]
    BodyRead { status: u16, message: String },

    #[error("unexpected response code '{status}': {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    /// A response or payload did not have the shape a resource operation needs.
    #[error("resource error: {0}")]
    Resource(String),
}

impl ApiError {
    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::BodyRead { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BodyRead { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while resolving credentials or computing a signature.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("no credentials found")]
    MissingCredentials,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("credential provider failed: {0}")]
    Provider(String),

    /// The request cannot be signed (no host, header value not encodable).
    #[error("cannot sign request: {0}")]
    InvalidRequest(String),
}
