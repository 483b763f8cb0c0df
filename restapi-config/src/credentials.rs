// restapi-config/src/credentials.rs
use directories::BaseDirs;
use restapi_client::{CredentialProvider, Credentials, SigningError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
const SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
const PROFILE: &str = "AWS_PROFILE";
const DEFAULT_PROFILE: &str = "default";

/// Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
/// `AWS_SESSION_TOKEN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentCredentials;

impl CredentialProvider for EnvironmentCredentials {
    fn credentials(&self) -> Result<Credentials, SigningError> {
        from_lookup(|key| std::env::var(key).ok())
    }
}

fn from_lookup<F>(lookup: F) -> Result<Credentials, SigningError>
where
    F: Fn(&str) -> Option<String>,
{
    let access_key = lookup(ACCESS_KEY_ID).filter(|v| !v.is_empty());
    let secret_key = lookup(SECRET_ACCESS_KEY).filter(|v| !v.is_empty());

    match (access_key, secret_key) {
        (Some(access_key), Some(secret_key)) => {
            let mut credentials = Credentials::new(access_key, secret_key);
            if let Some(token) = lookup(SESSION_TOKEN).filter(|v| !v.is_empty()) {
                credentials = credentials.with_session_token(token);
            }
            Ok(credentials)
        }
        _ => Err(SigningError::MissingCredentials),
    }
}

/// One profile of an INI-style shared credentials file.
#[derive(Debug, Clone, Default)]
pub struct SharedCredentialsFile {
    path: Option<PathBuf>,
    profile: Option<String>,
}

impl SharedCredentialsFile {
    /// With no explicit path the file comes from `AWS_SHARED_CREDENTIALS_FILE`
    /// or `~/.aws/credentials`; with no profile, `AWS_PROFILE` or `default`.
    pub fn new(path: Option<PathBuf>, profile: Option<String>) -> Self {
        Self { path, profile }
    }

    fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        if let Ok(path) = std::env::var(SHARED_CREDENTIALS_FILE) {
            return Some(PathBuf::from(path));
        }
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
    }

    fn resolve_profile(&self) -> String {
        self.profile
            .clone()
            .or_else(|| std::env::var(PROFILE).ok())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }
}

impl CredentialProvider for SharedCredentialsFile {
    fn credentials(&self) -> Result<Credentials, SigningError> {
        let path = self.resolve_path().ok_or(SigningError::MissingCredentials)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SigningError::MissingCredentials)
            }
            Err(e) => {
                return Err(SigningError::Provider(format!(
                    "couldn't read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let profile = self.resolve_profile();
        parse_profile(&content, &profile).ok_or(SigningError::MissingCredentials)
    }
}

/// Extract `profile` from shared credentials file `content`.
pub fn parse_profile(content: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "aws_access_key_id" => access_key = Some(value),
            "aws_secret_access_key" => secret_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }

    let mut credentials = Credentials::new(access_key?, secret_key?);
    if let Some(token) = session_token {
        credentials = credentials.with_session_token(token);
    }
    Some(credentials)
}

/// Environment first, then the shared credentials file.
pub struct DefaultCredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl DefaultCredentialChain {
    pub fn new(profile: Option<String>) -> Self {
        Self::from_providers(vec![
            Box::new(EnvironmentCredentials),
            Box::new(SharedCredentialsFile::new(None, profile)),
        ])
    }

    pub fn from_providers(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

impl CredentialProvider for DefaultCredentialChain {
    fn credentials(&self) -> Result<Credentials, SigningError> {
        for (index, provider) in self.providers.iter().enumerate() {
            match provider.credentials() {
                Ok(credentials) => return Ok(credentials),
                Err(SigningError::MissingCredentials) => {
                    debug!(provider = index, "no credentials from provider, trying next");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SigningError::MissingCredentials)
    }
}
