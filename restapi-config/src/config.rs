// restapi-config/src/config.rs
use crate::credentials::DefaultCredentialChain;
use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use restapi_client::{
    AccountHeader, ApiClient, ApiClientConfig, ReqwestTransport, SigV4Signer, DEFAULT_ID_ATTRIBUTE,
    DEFAULT_REDIRECT_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

/// Target endpoint and response-shape hints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub insecure: bool,
    /// Seconds, 0 for no timeout
    #[serde(default)]
    pub timeout: u64,
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    #[serde(default)]
    pub copy_keys: Vec<String>,
    #[serde(default)]
    pub write_returns_object: bool,
    #[serde(default)]
    pub create_returns_object: bool,
    #[serde(default = "default_redirect_limit")]
    pub redirect_limit: u32,
    #[serde(default)]
    pub debug: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            insecure: false,
            timeout: 0,
            id_attribute: default_id_attribute(),
            copy_keys: Vec::new(),
            write_returns_object: false,
            create_returns_object: false,
            redirect_limit: default_redirect_limit(),
            debug: false,
        }
    }
}

fn default_id_attribute() -> String {
    DEFAULT_ID_ATTRIBUTE.to_string()
}

fn default_redirect_limit() -> u32 {
    DEFAULT_REDIRECT_LIMIT
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Pre-built Authorization header, e.g. "Bearer ..."
    #[serde(default)]
    pub header: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningConfig {
    #[serde(default = "default_signing_enabled")]
    pub enabled: bool,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Shared credentials profile; falls back to AWS_PROFILE, then "default"
    #[serde(default)]
    pub profile: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            enabled: default_signing_enabled(),
            service: default_service(),
            region: default_region(),
            profile: None,
        }
    }
}

fn default_signing_enabled() -> bool {
    true
}

fn default_service() -> String {
    "execute-api".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    #[serde(default = "default_account_header")]
    pub header: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            header: default_account_header(),
            value: None,
        }
    }
}

fn default_account_header() -> String {
    "x-drench-account".to_string()
}

impl Config {
    /// Load from the default location, writing a default file first if
    /// none exists, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = config_dir.join("config.toml");

        if !config_path.exists() {
            let mut default = Self::default();
            default.save_to(&config_path)?;
            default.apply_env_overrides(|key| std::env::var(key).ok());
            return Ok(default);
        }

        Self::load_from(&config_path)
    }

    /// Load a specific file and apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Couldn't read config file {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Environment variables win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("RESTAPI_URI") {
            self.api.uri = uri;
        }
        if let Some(username) = lookup("RESTAPI_USERNAME") {
            self.auth.username = Some(username);
        }
        if let Some(password) = lookup("RESTAPI_PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Some(header) = lookup("RESTAPI_AUTH_HEADER") {
            self.auth.header = Some(header);
        }
        if let Some(account) = lookup("DRENCH_ACCOUNT") {
            self.account.value = Some(account);
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.signing.region = region;
        }
    }

    /// Write to `config_path`, creating missing parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(config_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(config_path, perms)?;
        }

        Ok(())
    }

    fn config_dir() -> Result<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("Cannot determine config directory"))?;
        Ok(base_dirs.config_dir().join("restapi"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Copy with secrets replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.auth.password.is_some() {
            copy.auth.password = Some(REDACTED.to_string());
        }
        if copy.auth.header.is_some() {
            copy.auth.header = Some(REDACTED.to_string());
        }
        copy
    }

    pub fn client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_uri: self.api.uri.clone(),
            insecure_tls: self.api.insecure,
            username: self.auth.username.clone(),
            password: self.auth.password.clone(),
            auth_header: self.auth.header.clone(),
            timeout_secs: self.api.timeout,
            id_attribute: self.api.id_attribute.clone(),
            copy_keys: self.api.copy_keys.clone(),
            write_returns_object: self.api.write_returns_object,
            create_returns_object: self.api.create_returns_object,
            debug: self.api.debug,
            redirect_limit: self.api.redirect_limit,
        }
    }

    /// Build a reqwest-backed client with the configured account header and,
    /// when enabled, a signer over the default credential chain.
    pub fn build_client(&self) -> Result<ApiClient<ReqwestTransport>> {
        if self.api.uri.is_empty() {
            return Err(anyhow!(
                "API URI not set. Set [api] uri in {} or the RESTAPI_URI environment variable",
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            ));
        }

        let mut client = ApiClient::new(self.client_config()).context("Couldn't build HTTP client")?;

        // Sent (and signed) even when no account is set, with an empty value.
        if !self.account.header.is_empty() {
            let value = self.account.value.clone().unwrap_or_default();
            client = client.with_account_header(AccountHeader::new(&self.account.header, value));
        }

        if self.signing.enabled {
            let chain = DefaultCredentialChain::new(self.signing.profile.clone());
            client = client.with_signer(SigV4Signer::new(
                &self.signing.service,
                &self.signing.region,
                chain,
            ));
        }

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.id_attribute, "id");
        assert_eq!(config.api.redirect_limit, 5);
        assert!(config.signing.enabled);
        assert_eq!(config.signing.service, "execute-api");
        assert_eq!(config.signing.region, "us-east-1");
        assert_eq!(config.account.header, "x-drench-account");
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml(
            r#"
            [api]
            uri = "https://api.example.com/"
            timeout = 30
            id_attribute = "data/uuid"
            copy_keys = ["revision", "owner"]
            write_returns_object = true

            [auth]
            header = "Bearer abc"

            [signing]
            enabled = false
            region = "eu-central-1"
            "#,
        )
        .unwrap();

        let client_config = config.client_config();
        assert_eq!(client_config.base_uri, "https://api.example.com/");
        assert_eq!(client_config.timeout_secs, 30);
        assert_eq!(client_config.id_attribute, "data/uuid");
        assert_eq!(client_config.copy_keys, vec!["revision", "owner"]);
        assert!(client_config.write_returns_object);
        assert!(!client_config.create_returns_object);
        assert_eq!(client_config.auth_header.as_deref(), Some("Bearer abc"));
        assert!(!config.signing.enabled);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("[api]\nuri = \"https://file.example.com\"").unwrap();
        let env: HashMap<&str, &str> = [
            ("RESTAPI_URI", "https://env.example.com"),
            ("DRENCH_ACCOUNT", "acct-9"),
            ("AWS_REGION", "ap-south-1"),
        ]
        .into_iter()
        .collect();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.uri, "https://env.example.com");
        assert_eq!(config.account.value.as_deref(), Some("acct-9"));
        assert_eq!(config.signing.region, "ap-south-1");
        assert!(config.auth.username.is_none());
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = Config::default();
        config.auth.username = Some("user".to_string());
        config.auth.password = Some("hunter2".to_string());
        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_build_client_requires_uri() {
        assert!(Config::default().build_client().is_err());
    }

    #[test]
    fn test_build_client_normalizes_uri() {
        let mut config = Config::default();
        config.api.uri = "https://api.example.com/".to_string();
        config.account.value = Some("acct".to_string());
        let client = config.build_client().unwrap();
        assert_eq!(client.base_uri(), "https://api.example.com");
        assert_eq!(client.signer().map(|s| s.service()), Some("execute-api"));
    }

    #[test]
    fn test_save_to_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("restapi-save-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let mut config = Config::default();
        config.api.uri = "https://api.example.com".to_string();

        config.save_to(&path).unwrap();
        let saved = Config::from_toml(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(saved.api.uri, "https://api.example.com");
    }

    #[test]
    fn test_account_header_sent_empty_when_unset() {
        let mut config = Config::default();
        config.api.uri = "https://api.example.com".to_string();
        let client = config.build_client().unwrap();
        let account = client.account_header().unwrap();
        assert_eq!(account.name, "x-drench-account");
        assert_eq!(account.value, "");
    }
}
