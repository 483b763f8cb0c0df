// restapi-client/src/auth.rs
use base64::prelude::*;

/// How a request authenticates itself before any signature is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode<'a> {
    /// Pre-built `Authorization` value, sent verbatim.
    Header(&'a str),
    Basic {
        username: &'a str,
        password: &'a str,
    },
    None,
}

impl<'a> AuthMode<'a> {
    /// A non-empty header always wins; basic auth needs both halves.
    pub fn select(auth_header: &'a str, username: &'a str, password: &'a str) -> Self {
        if !auth_header.is_empty() {
            AuthMode::Header(auth_header)
        } else if !username.is_empty() && !password.is_empty() {
            AuthMode::Basic { username, password }
        } else {
            AuthMode::None
        }
    }

    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            AuthMode::Header(value) => Some((*value).to_string()),
            AuthMode::Basic { username, password } => Some(basic_auth_value(username, password)),
            AuthMode::None => None,
        }
    }
}

/// Encode a username/password pair as an HTTP Basic credential
pub fn basic_auth_value(username: &str, password: &str) -> String {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}
