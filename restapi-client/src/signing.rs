// restapi-client/src/signing.rs
//! SigV4 request signing.
//!
//! The signature covers the method, canonical URI, canonical query string,
//! the `host` header plus every header already on the request, and the
//! SHA-256 of the body. It is bound to a service name and region, both of
//! which are configuration on [`SigV4Signer`].

use crate::error::SigningError;
use crate::http::HttpRequest;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const AMZ_DATE: &str = "x-amz-date";
const AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Headers that proxies and clients routinely rewrite.
const UNSIGNED_HEADERS: [&str; 3] = ["authorization", "user-agent", "x-amzn-trace-id"];

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const SIGV4_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An access key pair, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Source of signing credentials, consulted on every signed request.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials, SigningError>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials, SigningError> {
        Ok(self.clone())
    }
}

/// Signs requests for one service in one region.
#[derive(Clone)]
pub struct SigV4Signer {
    service: String,
    region: String,
    provider: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("service", &self.service)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl SigV4Signer {
    pub fn new(
        service: impl Into<String>,
        region: impl Into<String>,
        provider: impl CredentialProvider + 'static,
    ) -> Self {
        Self::with_provider(service, region, Arc::new(provider))
    }

    pub fn with_provider(
        service: impl Into<String>,
        region: impl Into<String>,
        provider: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            provider,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resolve credentials and sign `request` in place as of `now`.
    ///
    /// Adds `x-amz-date`, `x-amz-security-token` for session credentials,
    /// and replaces `Authorization` with the signature.
    pub fn sign(&self, request: &mut HttpRequest, now: DateTime<Utc>) -> Result<(), SigningError> {
        let credentials = self.provider.credentials()?;
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(SigningError::MissingCredentials);
        }

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        request
            .headers
            .insert(HeaderName::from_static(AMZ_DATE), header_value(&amz_date)?);
        if let Some(token) = &credentials.session_token {
            request
                .headers
                .insert(HeaderName::from_static(AMZ_SECURITY_TOKEN), header_value(token)?);
        }

        let (canonical_headers, signed_headers) = canonical_headers(request)?;
        let payload_hash = hex::encode(Sha256::digest(
            request.body.as_deref().unwrap_or_default().as_bytes(),
        ));

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method.as_str(),
            canonical_uri(request.url.path()),
            canonical_query(&request.url),
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(&credentials.secret_access_key, &date, &self.region, &self.service)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
        );
        request.headers.insert(AUTHORIZATION, header_value(&authorization)?);

        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, SigningError> {
    HeaderValue::from_str(value).map_err(|e| SigningError::InvalidRequest(e.to_string()))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

/// Each path segment is escaped again, so an already percent-encoded
/// path ends up double-encoded.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SIGV4_ENCODE).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &url::Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, SIGV4_ENCODE).to_string(),
                utf8_percent_encode(&v, SIGV4_ENCODE).to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns the canonical header block and the `;`-joined signed header list.
fn canonical_headers(request: &HttpRequest) -> Result<(String, String), SigningError> {
    let host = request
        .url
        .host_str()
        .ok_or_else(|| SigningError::InvalidRequest(format!("no host in '{}'", request.url)))?;
    let host = match request.url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    headers.insert("host".to_string(), vec![host]);

    for (name, value) in request.headers.iter() {
        let name = name.as_str();
        if name == "host" || UNSIGNED_HEADERS.contains(&name) {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.to_string())
            .or_default()
            .push(value.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    let canonical = headers
        .iter()
        .map(|(name, values)| format!("{}:{}\n", name, values.join(",")))
        .collect::<String>();
    let signed = headers.keys().cloned().collect::<Vec<_>>().join(";");

    Ok((canonical, signed))
}
