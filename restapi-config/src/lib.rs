pub mod config;
pub mod credentials;

pub use config::{AccountConfig, ApiConfig, AuthConfig, Config, SigningConfig};
pub use credentials::{
    parse_profile, DefaultCredentialChain, EnvironmentCredentials, SharedCredentialsFile,
};

// Re-export client types for convenience
pub use restapi_client::{ApiClient, ApiError, ApiObject, ReqwestTransport};
