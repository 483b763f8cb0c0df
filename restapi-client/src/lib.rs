// restapi-client/src/lib.rs
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod observer;
pub mod resource;
pub mod signing;

pub use auth::{basic_auth_value, AuthMode};
pub use client::{AccountHeader, ApiClient, ApiClientConfig, DEFAULT_ID_ATTRIBUTE, DEFAULT_REDIRECT_LIMIT};
pub use error::{ApiError, SigningError};
pub use self::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
pub use observer::{RequestObserver, TracingObserver};
pub use resource::{apply_copy_keys, extract_id, ApiObject};
pub use signing::{CredentialProvider, Credentials, SigV4Signer};

// Re-export reqwest transport when feature is enabled
#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;
